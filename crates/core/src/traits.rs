//! Seams between the translator and where its records go

use crate::error::Result;
use crate::types::KvRecord;

/// Destination for translated records
///
/// Records arrive in artifact order: ids strictly increasing. Implementors
/// must either accept a record completely or return an error.
pub trait RecordSink {
    /// Append one record
    fn write_record(&mut self, record: &KvRecord) -> Result<()>;
}

impl RecordSink for Vec<KvRecord> {
    fn write_record(&mut self, record: &KvRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &KvRecord) -> Result<()> {
        (**self).write_record(record)
    }
}

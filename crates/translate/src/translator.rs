//! Translation pipeline
//!
//! Drives scan -> normalize -> allocate -> emit over a whole bundle:
//!
//! 1. Scan the bundle for resource files (sorted by path)
//! 2. For each file: read it, normalize its items
//! 3. For each item: allocate key and identity, hand the record to the sink
//!
//! Strictly sequential. The revision counter is threaded through every
//! allocation; the first error aborts the run, since a partially seeded store
//! is worse than none.

use crate::allocator::{RevisionAllocator, DEFAULT_START_REVISION, DEFAULT_STRIDE};
use crate::normalizer::normalize;
use crate::scanner::{BundleScanner, ResourceFile};
use kinesnap_core::{Error, KvRecord, RecordSink, ResourceCatalog, Result, Revision};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Translation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Counter value the first record gets as its id
    pub start_revision: Revision,
    /// Distance between consecutive record ids
    pub stride: i64,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            start_revision: DEFAULT_START_REVISION,
            stride: DEFAULT_STRIDE,
        }
    }
}

impl TranslateOptions {
    /// Set the starting counter
    pub fn start_revision(mut self, start_revision: Revision) -> Self {
        self.start_revision = start_revision;
        self
    }

    /// Set the stride
    pub fn stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }
}

/// Something worth telling the operator about, in pipeline order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    /// Records were written for a resource file
    Translated {
        /// Resource file
        path: PathBuf,
        /// Resource segment used in keys
        resource: String,
        /// Number of records written
        count: usize,
    },
    /// A resource file had no items
    SkippedEmpty {
        /// Resource file
        path: PathBuf,
        /// Resource segment used in keys
        resource: String,
    },
    /// A resource file's kind is never translated
    Excluded {
        /// Resource file
        path: PathBuf,
        /// Kind token from the file name
        kind: String,
    },
}

impl TranslationEvent {
    /// Resource file the event is about
    pub fn path(&self) -> &Path {
        match self {
            TranslationEvent::Translated { path, .. }
            | TranslationEvent::SkippedEmpty { path, .. }
            | TranslationEvent::Excluded { path, .. } => path,
        }
    }
}

/// Outcome of a successful translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Directory resource files were read from
    pub resource_dir: PathBuf,
    /// Events in pipeline order
    pub events: Vec<TranslationEvent>,
    /// Total records handed to the sink
    pub records_written: usize,
    /// Id of the first record
    pub first_id: Option<Revision>,
    /// Id of the last record
    pub last_id: Option<Revision>,
    /// Counter after the last allocation
    pub next_revision: Revision,
}

impl TranslationReport {
    /// Number of resource files that produced records
    pub fn files_translated(&self) -> usize {
        self.count(|e| matches!(e, TranslationEvent::Translated { .. }))
    }

    /// Number of empty resource files
    pub fn files_skipped(&self) -> usize {
        self.count(|e| matches!(e, TranslationEvent::SkippedEmpty { .. }))
    }

    /// Number of excluded resource files
    pub fn files_excluded(&self) -> usize {
        self.count(|e| matches!(e, TranslationEvent::Excluded { .. }))
    }

    fn count(&self, pred: impl Fn(&TranslationEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Bundle-to-records translator
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: ResourceCatalog,
    scanner: BundleScanner,
    allocator: RevisionAllocator,
    options: TranslateOptions,
}

impl Translator {
    /// Create a translator with the standard catalog
    pub fn new(options: TranslateOptions) -> Result<Self> {
        Self::with_catalog(ResourceCatalog::standard(), options)
    }

    /// Create a translator with a custom catalog
    pub fn with_catalog(catalog: ResourceCatalog, options: TranslateOptions) -> Result<Self> {
        if options.start_revision < 1 {
            return Err(Error::InvalidConfig(format!(
                "start revision must be positive, got {}",
                options.start_revision
            )));
        }
        Ok(Translator {
            catalog,
            scanner: BundleScanner::new(catalog),
            allocator: RevisionAllocator::new(options.stride)?,
            options,
        })
    }

    /// Options this translator runs with
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate the bundle at `root` into `sink`
    pub fn translate(&self, root: &Path, sink: &mut dyn RecordSink) -> Result<TranslationReport> {
        self.translate_observed(root, sink, &mut |_| {})
    }

    /// Translate the bundle at `root`, reporting each event as it happens
    pub fn translate_observed(
        &self,
        root: &Path,
        sink: &mut dyn RecordSink,
        observer: &mut dyn FnMut(&TranslationEvent),
    ) -> Result<TranslationReport> {
        let scan = self.scanner.scan(root)?;
        info!(
            "Translating {} resource files from {}",
            scan.files.len(),
            scan.resource_dir.display()
        );

        let mut report = TranslationReport {
            resource_dir: scan.resource_dir.clone(),
            next_revision: self.options.start_revision,
            ..Default::default()
        };
        let mut emit_event = |report: &mut TranslationReport, event: TranslationEvent| {
            observer(&event);
            report.events.push(event);
        };

        // Excluded files are interleaved with the rest in path order.
        let mut excluded = scan.excluded.iter().peekable();
        for file in &scan.files {
            while let Some(skipped) = excluded.next_if(|x| x.path < file.path) {
                emit_event(&mut report, excluded_event(skipped));
            }

            let (event, written) = self.translate_file(file, &mut report.next_revision, sink)?;
            if let Some((first, last)) = written {
                report.first_id.get_or_insert(first);
                report.last_id = Some(last);
            }
            if let TranslationEvent::Translated { count, .. } = &event {
                report.records_written += count;
            }
            emit_event(&mut report, event);
        }
        for skipped in excluded {
            emit_event(&mut report, excluded_event(skipped));
        }

        info!(
            "Translated {} records from {} files ({} empty, {} excluded)",
            report.records_written,
            report.files_translated(),
            report.files_skipped(),
            report.files_excluded()
        );
        Ok(report)
    }

    /// Translate one resource file, advancing `counter`
    ///
    /// Returns the event describing the file and the first/last ids written.
    pub fn translate_file(
        &self,
        file: &ResourceFile,
        counter: &mut Revision,
        sink: &mut dyn RecordSink,
    ) -> Result<(TranslationEvent, Option<(Revision, Revision)>)> {
        let descriptor = self.catalog.resolve(&file.group, &file.kind);
        let contents = std::fs::read(&file.path).map_err(|e| Error::io(&file.path, e))?;
        let objects = normalize(&file.path, &contents)?;

        if objects.is_empty() {
            debug!(
                "Skipping empty {} resource file: {}",
                descriptor.resource_name,
                file.file_name()
            );
            let event = TranslationEvent::SkippedEmpty {
                path: file.path.clone(),
                resource: descriptor.resource_name,
            };
            return Ok((event, None));
        }

        debug!(
            "Writing {} {} resources from file: {}",
            objects.len(),
            descriptor.resource_name,
            file.file_name()
        );

        let mut first = None;
        let mut last = *counter;
        for object in &objects {
            if object.namespace.is_some() != descriptor.namespaced {
                debug!(
                    "{} {} namespace presence differs from catalog scope for {}",
                    object.kind, object.name, descriptor.resource_name
                );
            }

            let allocation = self.allocator.allocate(&descriptor, object, *counter)?;
            let record = KvRecord::created(
                allocation.key,
                allocation.identity,
                object.raw_value.clone(),
            );
            debug!("Allocated {} at id {}", record.key, record.id);
            sink.write_record(&record)?;

            first.get_or_insert(record.id);
            last = record.id;
            *counter = allocation.next;
        }

        let event = TranslationEvent::Translated {
            path: file.path.clone(),
            resource: descriptor.resource_name,
            count: objects.len(),
        };
        Ok((event, first.map(|f| (f, last))))
    }
}

fn excluded_event(file: &ResourceFile) -> TranslationEvent {
    debug!("Excluding {} resource file: {}", file.kind, file.file_name());
    TranslationEvent::Excluded {
        path: file.path.clone(),
        kind: file.kind.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RESOURCE_DIR_NAME;
    use std::fs;
    use tempfile::TempDir;

    fn bundle(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("cluster-data").join(RESOURCE_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        for (name, contents) in files {
            fs::write(dir.join(name), contents).unwrap();
        }
        temp_dir
    }

    fn pod(name: &str, namespace: &str) -> String {
        format!(
            "- apiVersion: v1\n  kind: Pod\n  metadata:\n    name: {}\n    namespace: {}\n",
            name, namespace
        )
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(Translator::new(TranslateOptions::default().stride(2)).is_err());
        assert!(Translator::new(TranslateOptions::default().start_revision(0)).is_err());
    }

    #[test]
    fn test_translate_counts_and_ids() {
        let pods = format!("items:\n{}{}", pod("a", "d"), pod("b", "d"));
        let bundle = bundle(&[
            ("pods.yaml", &pods),
            ("configmaps.yaml", "items: []\n"),
            ("secrets.yaml", "this: [is not: valid"),
        ]);

        let translator = Translator::new(TranslateOptions::default().start_revision(10)).unwrap();
        let mut records: Vec<KvRecord> = Vec::new();
        let report = translator.translate(bundle.path(), &mut records).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(report.records_written, 2);
        assert_eq!(report.first_id, Some(10));
        assert_eq!(report.last_id, Some(14));
        assert_eq!(report.next_revision, 18);
        assert_eq!(report.files_translated(), 1);
        assert_eq!(report.files_skipped(), 1);
        assert_eq!(report.files_excluded(), 1);

        // Events arrive in path order.
        let names: Vec<_> = report
            .events
            .iter()
            .map(|e| e.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["configmaps.yaml", "pods.yaml", "secrets.yaml"]);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_per_file_messages_stay_below_info() {
        let pods = format!("items:\n{}", pod("a", "d"));
        let bundle = bundle(&[
            ("pods.yaml", &pods),
            ("configmaps.yaml", "items: []\n"),
            ("secrets.yaml", "x"),
        ]);

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let translator = Translator::new(TranslateOptions::default()).unwrap();
        let mut records: Vec<KvRecord> = Vec::new();
        let report = tracing::subscriber::with_default(subscriber, || {
            translator.translate(bundle.path(), &mut records).unwrap()
        });
        assert_eq!(report.events.len(), 3);

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Translated 1 records"));
        assert!(!output.contains("Writing"));
        assert!(!output.contains("Skipping empty"));
        assert!(!output.contains("Excluding"));
    }

    #[test]
    fn test_observer_sees_every_event() {
        let bundle = bundle(&[("pods.yaml", "items: []\n"), ("secrets.yaml", "x")]);
        let translator = Translator::new(TranslateOptions::default()).unwrap();
        let mut seen = Vec::new();
        let mut records: Vec<KvRecord> = Vec::new();
        let report = translator
            .translate_observed(bundle.path(), &mut records, &mut |e| seen.push(e.clone()))
            .unwrap();
        assert_eq!(seen, report.events);
        assert!(records.is_empty());
        assert_eq!(report.first_id, None);
    }

    #[test]
    fn test_malformed_object_aborts() {
        let bad = "items:\n- apiVersion: v1\n  kind: Pod\n  metadata: {}\n";
        let bundle = bundle(&[("pods.yaml", bad)]);
        let translator = Translator::new(TranslateOptions::default()).unwrap();
        let mut records: Vec<KvRecord> = Vec::new();
        let err = translator.translate(bundle.path(), &mut records).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("pods.yaml"));
    }

    #[test]
    fn test_same_bundle_same_ids() {
        let pods = format!("items:\n{}{}", pod("a", "d"), pod("b", "e"));
        let bundle = bundle(&[("pods.yaml", &pods), ("deployments.apps.yaml", &pods)]);
        let translator = Translator::new(TranslateOptions::default()).unwrap();

        let mut first: Vec<KvRecord> = Vec::new();
        let mut second: Vec<KvRecord> = Vec::new();
        translator.translate(bundle.path(), &mut first).unwrap();
        translator.translate(bundle.path(), &mut second).unwrap();
        assert_eq!(first, second);
    }
}

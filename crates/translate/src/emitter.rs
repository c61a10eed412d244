//! Record emitter
//!
//! Renders a [`KvRecord`] as a single insert statement against the kine table:
//!
//! ```text
//! INSERT INTO kine(id, name, created, deleted, create_revision, prev_revision, lease, value, old_value) VALUES(100000000, '/registry/pods/default/web-1', 1, 0, 100000001, 100000002, 0, '{...}', '{...}');
//! ```
//!
//! String columns are single-quoted literals; the only escaping applied is
//! doubling every `'`. Each statement is a complete unit on its own line, so
//! statements never contain a raw line break.

use kinesnap_core::{Error, KvRecord, Result, StorageKey};
use std::borrow::Cow;

/// Fixed head of every emitted statement
pub const INSERT_PREFIX: &str = "INSERT INTO kine(id, name, created, deleted, create_revision, prev_revision, lease, value, old_value) VALUES(";

const STATEMENT_SUFFIX: &str = ");";

/// Double every single quote
pub fn escape_literal(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !bytes.contains(&b'\'') {
        return Cow::Borrowed(bytes);
    }
    let mut out = Vec::with_capacity(bytes.len() + 8);
    for &b in bytes {
        out.push(b);
        if b == b'\'' {
            out.push(b'\'');
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape_literal`]
///
/// Fails on a lone quote, which an escaped literal never contains.
pub fn unescape_literal(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' {
            if bytes.get(i + 1) != Some(&b'\'') {
                return Err(Error::MalformedRecord(format!(
                    "unpaired quote at byte {}",
                    i
                )));
            }
            i += 1;
        }
        out.push(b);
        i += 1;
    }
    Ok(out)
}

/// Render one record as a complete statement, without a line terminator
pub fn emit(record: &KvRecord) -> Result<Vec<u8>> {
    for (column, bytes) in [
        ("name", record.key.as_str().as_bytes()),
        ("value", record.value.as_slice()),
        ("old_value", record.old_value.as_slice()),
    ] {
        if bytes.iter().any(|b| *b == b'\n' || *b == b'\r') {
            return Err(Error::MalformedRecord(format!(
                "{} of record {} contains a line break",
                column, record.id
            )));
        }
    }

    let mut out = Vec::with_capacity(
        INSERT_PREFIX.len() + record.key.as_str().len() + 2 * record.value.len() + 96,
    );
    out.extend_from_slice(INSERT_PREFIX.as_bytes());
    out.extend_from_slice(format!("{}, ", record.id).as_bytes());
    push_literal(&mut out, record.key.as_str().as_bytes());
    out.extend_from_slice(
        format!(
            ", {}, {}, {}, {}, {}, ",
            record.created as u8,
            record.deleted as u8,
            record.create_revision,
            record.prev_revision,
            record.lease
        )
        .as_bytes(),
    );
    push_literal(&mut out, &record.value);
    out.extend_from_slice(b", ");
    push_literal(&mut out, &record.old_value);
    out.extend_from_slice(STATEMENT_SUFFIX.as_bytes());
    Ok(out)
}

fn push_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'\'');
    out.extend_from_slice(&escape_literal(bytes));
    out.push(b'\'');
}

/// Decode a statement produced by [`emit`] back into its record
///
/// A trailing line terminator is tolerated. Anything else that deviates from
/// the emitted shape, including a truncated statement, is `MalformedRecord`.
pub fn decode(statement: &[u8]) -> Result<KvRecord> {
    let statement = trim_line_end(statement);
    let body = statement
        .strip_prefix(INSERT_PREFIX.as_bytes())
        .ok_or_else(|| Error::MalformedRecord("missing insert prefix".to_string()))?
        .strip_suffix(STATEMENT_SUFFIX.as_bytes())
        .ok_or_else(|| Error::MalformedRecord("statement is not terminated".to_string()))?;

    let mut cursor = Cursor { bytes: body, pos: 0 };
    let id = cursor.integer()?;
    cursor.separator()?;
    let key = cursor.literal()?;
    cursor.separator()?;
    let created = cursor.flag()?;
    cursor.separator()?;
    let deleted = cursor.flag()?;
    cursor.separator()?;
    let create_revision = cursor.integer()?;
    cursor.separator()?;
    let prev_revision = cursor.integer()?;
    cursor.separator()?;
    let lease = cursor.integer()?;
    cursor.separator()?;
    let value = cursor.literal()?;
    cursor.separator()?;
    let old_value = cursor.literal()?;
    cursor.end()?;

    let key = String::from_utf8(key)
        .map_err(|_| Error::MalformedRecord("name is not valid UTF-8".to_string()))?;

    Ok(KvRecord {
        id,
        key: StorageKey::from_raw(key),
        created,
        deleted,
        create_revision,
        prev_revision,
        lease,
        value,
        old_value,
    })
}

fn trim_line_end(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn error(&self, what: &str) -> Error {
        Error::MalformedRecord(format!("{} at byte {}", what, self.pos))
    }

    fn separator(&mut self) -> Result<()> {
        if self.bytes[self.pos..].starts_with(b", ") {
            self.pos += 2;
            Ok(())
        } else {
            Err(self.error("expected ', '"))
        }
    }

    fn integer(&mut self) -> Result<i64> {
        let start = self.pos;
        if self.bytes.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        while self.bytes.get(self.pos).map_or(false, u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error("expected integer"))
    }

    fn flag(&mut self) -> Result<bool> {
        match self.integer()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.error("expected 0 or 1")),
        }
    }

    fn literal(&mut self) -> Result<Vec<u8>> {
        if self.bytes.get(self.pos) != Some(&b'\'') {
            return Err(self.error("expected quoted literal"));
        }
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(self.error("unterminated literal")),
                Some(b'\'') if self.bytes.get(self.pos + 1) == Some(&b'\'') => self.pos += 2,
                Some(b'\'') => break,
                Some(_) => self.pos += 1,
            }
        }
        let raw = &self.bytes[start..self.pos];
        self.pos += 1;
        unescape_literal(raw)
    }

    fn end(&self) -> Result<()> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing data"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesnap_core::RevisionTriple;
    use proptest::prelude::*;

    fn record(key: &str, value: &[u8]) -> KvRecord {
        KvRecord::created(
            StorageKey::from_raw(key),
            RevisionTriple {
                id: 100_000_000,
                create_revision: 100_000_001,
                prev_revision: 100_000_002,
            },
            value.to_vec(),
        )
    }

    #[test]
    fn test_emit_exact_statement() {
        let statement = emit(&record("/registry/minions/node-a", br#"{"kind":"Node"}"#)).unwrap();
        assert_eq!(
            String::from_utf8(statement).unwrap(),
            "INSERT INTO kine(id, name, created, deleted, create_revision, prev_revision, lease, value, old_value) \
             VALUES(100000000, '/registry/minions/node-a', 1, 0, 100000001, 100000002, 0, \
             '{\"kind\":\"Node\"}', '{\"kind\":\"Node\"}');"
        );
    }

    #[test]
    fn test_apostrophes_doubled() {
        let statement = emit(&record("/registry/configmaps/d/q", br#"{"msg":"it's"}"#)).unwrap();
        let text = String::from_utf8(statement).unwrap();
        assert_eq!(text.matches("it''s").count(), 2);
        assert!(!text.contains("it's"));
    }

    #[test]
    fn test_decode_reverses_emit() {
        let original = record("/registry/configmaps/d/q", br#"{"a":"'','x'"}"#);
        let statement = emit(&original).unwrap();
        assert_eq!(decode(&statement).unwrap(), original);

        let mut line = statement.clone();
        line.push(b'\n');
        assert_eq!(decode(&line).unwrap(), original);
    }

    #[test]
    fn test_decode_rejects_truncated_statement() {
        let statement = emit(&record("/registry/pods/d/p", b"{}")).unwrap();
        for cut in [10, INSERT_PREFIX.len() + 5, statement.len() - 1, statement.len() - 4] {
            assert!(decode(&statement[..cut]).is_err(), "cut at {} should fail", cut);
        }
    }

    #[test]
    fn test_decode_rejects_lone_quote() {
        let bad = format!(
            "{}1, '/registry/x', 1, 0, 2, 3, 0, 'it's', 'x');",
            INSERT_PREFIX
        );
        assert!(decode(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_line_break_rejected() {
        assert!(emit(&record("/registry/pods/d/p", b"{\n}")).is_err());
    }

    #[test]
    fn test_unescape_lone_quote() {
        assert!(unescape_literal(b"a'b").is_err());
        assert_eq!(unescape_literal(b"a''b").unwrap(), b"a'b");
    }

    proptest! {
        #[test]
        fn prop_literal_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let escaped = escape_literal(&bytes);
            prop_assert_eq!(unescape_literal(&escaped).unwrap(), bytes);
        }

        #[test]
        fn prop_record_roundtrip(value in "[^\r\n]{0,200}", id in 1i64..i64::MAX / 2) {
            let original = KvRecord::created(
                StorageKey::from_raw("/registry/configmaps/default/cm"),
                RevisionTriple { id, create_revision: id + 1, prev_revision: id + 2 },
                value.into_bytes(),
            );
            let statement = emit(&original).unwrap();
            prop_assert_eq!(decode(&statement).unwrap(), original);
        }
    }
}

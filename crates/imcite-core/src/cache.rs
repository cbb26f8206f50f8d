//! Append-only bibliography cache
//!
//! Loads the persisted bibliography once per run, tracks which citation
//! keys are already covered, and appends newly resolved records. The
//! file is only ever replaced whole, via a temporary file in the same
//! directory and an atomic rename, so the on-disk state is always
//! either the previous complete bibliography or the new one. A stray
//! temp file left behind by a kill between write and rename is an
//! accepted risk; the target file itself can never be torn.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::ResolvedRecord;
use crate::error::CacheError;

/// Bibliography file format, selected strictly by filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibFormat {
    /// CSL-JSON array
    Json,
    /// The same structure in YAML
    Yaml,
}

impl BibFormat {
    pub fn from_path(path: &Path) -> Result<Self, CacheError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(BibFormat::Json),
            Some("yaml") => Ok(BibFormat::Yaml),
            _ => Err(CacheError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// In-memory view of the bibliography file plus buffered additions
pub struct Bibliography {
    target: Option<(PathBuf, BibFormat)>,
    // BTreeMap keeps serialization deterministic, which makes flush
    // idempotent byte for byte
    entries: BTreeMap<String, Value>,
}

impl Bibliography {
    /// Cache with no backing file; `flush` is a no-op
    pub fn in_memory() -> Self {
        Self {
            target: None,
            entries: BTreeMap::new(),
        }
    }

    /// Load the bibliography at `path`. A missing file is an empty
    /// cache; an unparseable one is fatal, because silently discarding
    /// prior records would violate the append-only guarantee.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let format = BibFormat::from_path(path)?;

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let records: Vec<Value> = if contents.trim().is_empty() {
            Vec::new()
        } else {
            parse_records(&contents, format).map_err(|message| CacheError::Corrupt {
                path: path.to_path_buf(),
                message,
            })?
        };

        let mut entries = BTreeMap::new();
        for record in records {
            let id = record.get("id").and_then(record_key).ok_or_else(|| {
                CacheError::Corrupt {
                    path: path.to_path_buf(),
                    message: "record without a usable `id` member".to_string(),
                }
            })?;
            entries.insert(id, record);
        }

        debug!(count = entries.len(), ?path, "loaded bibliography cache");
        Ok(Self {
            target: Some((path.to_path_buf(), format)),
            entries,
        })
    }

    /// Whether `key` is already covered by the bibliography
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Buffer a newly resolved record. Pre-existing entries are never
    /// overwritten; a duplicate append is ignored.
    pub fn append(&mut self, record: ResolvedRecord) {
        if self.entries.contains_key(&record.key) {
            debug!(key = %record.key, "cache already covers key, append ignored");
            return;
        }
        self.entries.insert(record.key, record.record);
    }

    /// Write the full in-memory set to a temporary file in the target's
    /// directory and atomically replace the target. On failure the
    /// original file is left untouched.
    pub fn flush(&self) -> Result<(), CacheError> {
        let (path, format) = match &self.target {
            Some(target) => target,
            None => return Ok(()),
        };

        let records: Vec<&Value> = self.entries.values().collect();
        let serialized = serialize_records(&records, *format).map_err(|message| {
            CacheError::WriteFailed {
                path: path.clone(),
                message,
            }
        })?;

        let dir = match path.parent() {
            Some(parent) if parent != Path::new("") => parent,
            _ => Path::new("."),
        };

        let write_failed = |e: &dyn std::fmt::Display| CacheError::WriteFailed {
            path: path.clone(),
            message: e.to_string(),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_failed(&e))?;
        temp.write_all(serialized.as_bytes())
            .map_err(|e| write_failed(&e))?;
        temp.flush().map_err(|e| write_failed(&e))?;
        temp.persist(path).map_err(|e| write_failed(&e))?;

        debug!(count = records.len(), ?path, "flushed bibliography cache");
        Ok(())
    }

    /// Number of records currently held (persisted plus buffered)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Record ids arrive as strings or numbers depending on what produced
/// the bibliography; both are valid, numbers are keyed by their string
/// form
fn record_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_records(contents: &str, format: BibFormat) -> Result<Vec<Value>, String> {
    match format {
        BibFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        BibFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
    }
}

fn serialize_records(records: &[&Value], format: BibFormat) -> Result<String, String> {
    match format {
        BibFormat::Json => serde_json::to_string_pretty(records)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        BibFormat::Yaml => serde_yaml::to_string(records).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(key: &str, title: &str) -> ResolvedRecord {
        ResolvedRecord {
            key: key.to_string(),
            record: json!({"id": key, "type": "article-journal", "title": title}),
        }
    }

    // === Format selection ===

    #[test]
    fn test_format_by_suffix() {
        assert_eq!(
            BibFormat::from_path(Path::new("bib.json")).unwrap(),
            BibFormat::Json
        );
        assert_eq!(
            BibFormat::from_path(Path::new("bib.yaml")).unwrap(),
            BibFormat::Yaml
        );
    }

    #[test]
    fn test_unknown_suffix_is_an_error() {
        assert!(matches!(
            BibFormat::from_path(Path::new("bib.bib")),
            Err(CacheError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            BibFormat::from_path(Path::new("bib")),
            Err(CacheError::UnsupportedFormat { .. })
        ));
    }

    // === Load ===

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let bib = Bibliography::load(&dir.path().join("absent.json")).unwrap();
        assert!(bib.is_empty());
    }

    #[test]
    fn test_load_json_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, r#"[{"id": "doe:2020", "title": "A Paper"}]"#).unwrap();

        let bib = Bibliography::load(&path).unwrap();
        assert_eq!(bib.len(), 1);
        assert!(bib.contains("doe:2020"));
        assert!(!bib.contains("other"));
    }

    #[test]
    fn test_load_yaml_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.yaml");
        std::fs::write(&path, "- id: doe:2020\n  title: A Paper\n").unwrap();

        let bib = Bibliography::load(&path).unwrap();
        assert!(bib.contains("doe:2020"));
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, "{not json at all").unwrap();

        assert!(matches!(
            Bibliography::load(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_load_accepts_numeric_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, r#"[{"id": 42, "title": "Numbered"}]"#).unwrap();

        let bib = Bibliography::load(&path).unwrap();
        assert_eq!(bib.len(), 1);
        assert!(bib.contains("42"));
    }

    #[test]
    fn test_record_without_id_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, r#"[{"title": "No Id"}]"#).unwrap();

        assert!(matches!(
            Bibliography::load(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }

    // === Append & flush ===

    #[test]
    fn test_append_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(
            &path,
            r#"[{"id": "K1", "title": "Original Title"}]"#,
        )
        .unwrap();

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("K1", "Replacement Title"));
        bib.flush().unwrap();

        let reloaded = Bibliography::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Original Title"));
        assert!(!contents.contains("Replacement Title"));
    }

    #[test]
    fn test_flush_roundtrip_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("doe:2020", "A Paper"));
        bib.flush().unwrap();

        let reloaded = Bibliography::load(&path).unwrap();
        assert!(reloaded.contains("doe:2020"));
    }

    #[test]
    fn test_flush_roundtrip_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.yaml");

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("doe:2020", "A Paper"));
        bib.flush().unwrap();

        let reloaded = Bibliography::load(&path).unwrap();
        assert!(reloaded.contains("doe:2020"));
    }

    #[test]
    fn test_double_flush_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("doe:2020", "A Paper"));
        bib.flush().unwrap();
        let first = std::fs::read(&path).unwrap();

        bib.flush().unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_in_memory_flush_is_noop() {
        let mut bib = Bibliography::in_memory();
        bib.append(record("doe:2020", "A Paper"));
        bib.flush().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_leaves_original_intact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, r#"[{"id": "K1", "title": "A Paper"}]"#).unwrap();

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("K2", "Another"));

        // Read-only directory: the temp file cannot be created
        let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
        perms.set_mode(0o555);
        std::fs::set_permissions(dir.path(), perms).unwrap();

        // Directory permissions do not bind root; skip the injection
        // when they are not enforced
        let enforced = std::fs::File::create(dir.path().join("probe")).is_err();
        if enforced {
            let result = bib.flush();
            assert!(matches!(result, Err(CacheError::WriteFailed { .. })));
        }

        // Restore so TempDir can clean up
        let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(dir.path(), perms).unwrap();
        let _ = std::fs::remove_file(dir.path().join("probe"));

        let reloaded = Bibliography::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains("K1"));
    }

    #[test]
    fn test_write_failure_reports_write_failed() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so the temp file cannot be
        // created and flush must fail without touching anything
        let path = dir.path().join("missing").join("bib.json");

        let mut bib = Bibliography::load(&path).unwrap();
        bib.append(record("K2", "Another"));
        assert!(matches!(
            bib.flush(),
            Err(CacheError::WriteFailed { .. })
        ));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetframe_core::document::SheetDocument;
use thiserror::Error;

/// 快照格式版本；读取时版本不符直接报错。
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot {path:?}: {source}")]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<SheetDocument, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &SheetDocument, path: &Path) -> Result<(), IoError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    document: SheetDocument,
}

/// 以 JSON 保存/读取宿主文档快照，便于在脱离宿主的环境中复现布局操作。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshot {
    pretty: bool,
}

impl JsonSnapshot {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn parse(&self, content: &str, path: &Path) -> Result<SheetDocument, IoError> {
        let snapshot: Snapshot =
            serde_json::from_str(content).map_err(|source| IoError::InvalidSnapshot {
                path: path.to_path_buf(),
                source,
            })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IoError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot.document)
    }

    pub fn render(&self, document: &SheetDocument) -> Result<String, serde_json::Error> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            document: document.clone(),
        };
        if self.pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        }
    }
}

impl DocumentLoader for JsonSnapshot {
    fn load(&self, path: &Path) -> Result<SheetDocument, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&data, path)
    }
}

impl DocumentSaver for JsonSnapshot {
    fn save(&self, document: &SheetDocument, path: &Path) -> Result<(), IoError> {
        let data = self
            .render(document)
            .map_err(|source| IoError::InvalidSnapshot {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_version() {
        let content = r#"{"version": 9, "document": {"sheets": [], "frames": [], "views": [], "placements": [], "next_id": 0}}"#;
        let err = JsonSnapshot::new()
            .parse(content, Path::new("memory.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::UnsupportedVersion {
                found: 9,
                expected: SNAPSHOT_VERSION
            }
        ));
    }

    #[test]
    fn reports_malformed_json() {
        let err = JsonSnapshot::new()
            .parse("{ not json", Path::new("broken.json"))
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidSnapshot { .. }));
    }
}

//! Filesystem object store.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, bail};
use async_trait::async_trait;

use crate::domain::ports::{ObjectStore, RawRecord};

/// Reads objects as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            bail!("invalid object name: {name}");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn read_records(&self, name: &str) -> anyhow::Result<Vec<RawRecord>> {
        let path = self.resolve(name)?;
        tracing::debug!(object = name, path = %path.display(), "reading object");

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                bail!("object does not exist: {name}")
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read object {name}"));
            }
        };

        let records = parse_ndjson(&text)?;
        tracing::info!(object = name, records = records.len(), "object processed");
        Ok(records)
    }
}

/// Decode each non-blank line as a JSON object.
fn parse_ndjson(text: &str) -> anyhow::Result<Vec<RawRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<RawRecord>(line)
                .with_context(|| format!("failed to unmarshal JSON line {}", idx + 1))
        })
        .collect()
}

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WorkmapError};

/// Static mapping from non-canonical login names to canonical ones.
///
/// People often hold different login names on different trackers; the alias
/// table folds those into one aggregation key. Resolution is one-directional
/// and single-hop: the canonical side of an entry is never looked up again.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load an alias table from a TOML file with an `[aliases]` table of
    /// `alias = "canonical"` entries.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkmapError::Config(format!("failed to read alias file {}: {}", path.display(), e))
        })?;
        let parsed: AliasFile = toml::from_str(&content).map_err(|e| {
            WorkmapError::Config(format!(
                "failed to parse alias file {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(
            "loaded {} aliases from {}",
            parsed.aliases.len(),
            path.display()
        );
        Ok(Self {
            aliases: parsed.aliases,
        })
    }

    /// Resolve a raw login to its canonical identity: the aliased name when
    /// `raw` is a key, otherwise `raw` unchanged. Never chains.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

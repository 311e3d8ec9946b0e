use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One expansion within a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expansion {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub release_year: Option<u32>,
}

/// A series grouping of expansions, e.g. "Scarlet & Violet".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub expansions: Vec<Expansion>,
}

/// Raw sets.json file format
#[derive(Debug, Deserialize)]
struct SetsFile {
    #[serde(default)]
    series: Vec<Series>,
}

/// Flattened display option: one selectable series/expansion pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOption {
    pub series: String,
    pub expansion: String,
    pub code: String,
    pub release_year: Option<u32>,
}

/// Set metadata catalog, loaded from a JSON data file and owned by the
/// caller. Nothing here is a process-wide singleton; drop or reload the
/// catalog to invalidate it.
#[derive(Debug, Clone, Default)]
pub struct SetCatalog {
    series: Vec<Series>,
    data_dir: Option<PathBuf>,
}

impl SetCatalog {
    /// Load set metadata from `sets.json` in the data directory.
    /// A missing file is an empty catalog, not an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("sets.json");
        if !path.exists() {
            tracing::warn!(
                "No sets.json found at {}. Set suggestions disabled.",
                path.display()
            );
            return Ok(Self {
                series: Vec::new(),
                data_dir: Some(data_dir.to_path_buf()),
            });
        }

        let content = std::fs::read_to_string(&path).context("Failed to read sets.json")?;
        let file: SetsFile = serde_json::from_str(&content).context("Failed to parse sets.json")?;

        tracing::info!("Loaded {} series from {}", file.series.len(), path.display());
        Ok(Self {
            series: file.series,
            data_dir: Some(data_dir.to_path_buf()),
        })
    }

    /// Re-read the catalog from the directory it was loaded from.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(dir) = self.data_dir.clone() {
            *self = Self::load(&dir)?;
        }
        Ok(())
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Expansions of a series, matched case-insensitively.
    pub fn expansions_of(&self, series_name: &str) -> Vec<&Expansion> {
        self.series
            .iter()
            .filter(|s| s.name.eq_ignore_ascii_case(series_name))
            .flat_map(|s| s.expansions.iter())
            .collect()
    }

    /// Every series/expansion pair as a flat list of display options,
    /// newest release year first.
    pub fn flatten(&self) -> Vec<SetOption> {
        let mut options: Vec<SetOption> = self
            .series
            .iter()
            .flat_map(|s| {
                s.expansions.iter().map(|e| SetOption {
                    series: s.name.clone(),
                    expansion: e.name.clone(),
                    code: e.code.clone(),
                    release_year: e.release_year,
                })
            })
            .collect();

        // Newest first; unknown years sink to the end
        options.sort_by(|a, b| {
            b.release_year
                .unwrap_or(0)
                .cmp(&a.release_year.unwrap_or(0))
                .then_with(|| a.series.cmp(&b.series))
                .then_with(|| a.expansion.cmp(&b.expansion))
        });
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent() {
        let catalog = SetCatalog::load(Path::new("/nonexistent")).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.flatten().is_empty());
    }

    #[test]
    fn test_load_and_flatten_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sets.json"),
            r#"{
                "series": [
                    {
                        "name": "Base",
                        "expansions": [
                            { "name": "Base Set", "code": "BS", "releaseYear": 1999 }
                        ]
                    },
                    {
                        "name": "Scarlet & Violet",
                        "expansions": [
                            { "name": "Paldea Evolved", "code": "PAL", "releaseYear": 2023 },
                            { "name": "Obsidian Flames", "code": "OBF", "releaseYear": 2023 }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let catalog = SetCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.series().len(), 2);
        assert_eq!(catalog.expansions_of("scarlet & violet").len(), 2);

        let options = catalog.flatten();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].expansion, "Obsidian Flames");
        assert_eq!(options[2].expansion, "Base Set");
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = SetCatalog::load(dir.path()).unwrap();
        assert!(catalog.is_empty());

        std::fs::write(
            dir.path().join("sets.json"),
            r#"{ "series": [ { "name": "Base", "expansions": [] } ] }"#,
        )
        .unwrap();
        catalog.reload().unwrap();
        assert_eq!(catalog.series().len(), 1);
    }
}

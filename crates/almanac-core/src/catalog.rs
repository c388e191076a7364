use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, anyhow};
use serde::Deserialize;
use tracing::{debug, info};

use crate::category::SeasonalCategory;
use crate::templates::Template;

/// Read-only view of a category store export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<SeasonalCategory>,

    #[serde(default)]
    pub templates: Vec<Template>,
}

impl Catalog {
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let catalog = match extension.as_str() {
            "toml" => load_toml(path)?,
            "json" => load_json(path)?,
            "jsonl" => Catalog {
                categories: load_jsonl(path)?,
                templates: vec![],
            },
            other => {
                return Err(anyhow!(
                    "unsupported catalog format {other:?} for {}; expected .toml, .json or .jsonl",
                    path.display()
                ));
            }
        };

        catalog.check_unique_ids()?;
        info!(
            categories = catalog.categories.len(),
            templates = catalog.templates.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    fn check_unique_ids(&self) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        for category in &self.categories {
            if !seen.insert(category.id) {
                return Err(anyhow!("duplicate category id {}", category.id));
            }
        }
        Ok(())
    }
}

fn load_toml(path: &Path) -> anyhow::Result<Catalog> {
    debug!(file = %path.display(), "loading toml catalog");
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

fn load_json(path: &Path) -> anyhow::Result<Catalog> {
    debug!(file = %path.display(), "loading json catalog");
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

fn load_jsonl(path: &Path) -> anyhow::Result<Vec<SeasonalCategory>> {
    debug!(file = %path.display(), "loading jsonl catalog");
    let file = fs::File::open(path)
        .with_context(|| format!("failed opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let category: SeasonalCategory = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(category);
    }

    debug!(count = out.len(), "loaded categories from jsonl");
    Ok(out)
}

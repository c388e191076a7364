use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

const CONFIG_ENV_VAR: &str =
  "ALMANACRC";
const CONFIG_FILE_NAME: &str =
  ".almanacrc";
const DEFAULT_CATALOG: &str =
  "~/.almanac/catalog.toml";

/// Which year day counts are checked
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceYear {
  /// The year of the evaluation date.
  Today,
  Fixed(i32)
}

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "catalog.location".to_string(),
      DEFAULT_CATALOG.to_string()
    );
    map.insert(
      "calendar.reference_year"
        .to_string(),
      "today".to_string()
    );
    map.insert(
      "default.command".to_string(),
      "status".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    Self { map }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let path = resolve_config_path(
      config_override
    )?;
    if let Some(path) = path {
      info!(config = %path.display(), "loading config");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no config file found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_i32(
    &self,
    key: &str
  ) -> anyhow::Result<Option<i32>> {
    self
      .map
      .get(key)
      .map(|v| {
        v.trim().parse::<i32>().map_err(
          |e| {
            anyhow!(
              "invalid integer for \
               {key}: {v} ({e})"
            )
          }
        )
      })
      .transpose()
  }

  pub fn reference_year(
    &self
  ) -> anyhow::Result<ReferenceYear> {
    match self
      .get("calendar.reference_year")
      .as_deref()
      .map(str::trim)
    {
      | None | Some("today") => {
        Ok(ReferenceYear::Today)
      }
      | Some(_) => {
        let year = self
          .get_i32(
            "calendar.reference_year"
          )?
          .ok_or_else(|| {
            anyhow!(
              "missing reference year"
            )
          })?;
        Ok(ReferenceYear::Fixed(year))
      }
    }
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = raw_line
        .split_once('#')
        .map_or(raw_line, |(before, _)| {
          before
        })
        .trim();
      if line.is_empty() {
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Catalog file to read: explicit flag
/// first, then `catalog.location`.
pub fn resolve_catalog_path(
  cfg: &Config,
  override_path: Option<&Path>
) -> anyhow::Result<PathBuf> {
  if let Some(path) = override_path {
    return Ok(path.to_path_buf());
  }

  let value = cfg
    .get("catalog.location")
    .ok_or_else(|| {
      anyhow!(
        "catalog.location is not set"
      )
    })?;
  Ok(expand_tilde(Path::new(&value)))
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if env_path == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      env_path
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; using defaults"
    );
    return Ok(None);
  };
  let candidate =
    home.join(CONFIG_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

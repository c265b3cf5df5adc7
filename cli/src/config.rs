//! Project configuration, read from a `blockdown.toml` next to the
//! template being rendered.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory partials are resolved under. Relative paths are joined to
    /// the config file's directory. Defaults to the template's directory.
    pub templates_dir: Option<PathBuf>,

    /// Format assumed when `--format` is not given ("slack_message" or
    /// "slack_modal").
    pub default_format: Option<String>,
}

impl Config {
    /// Load `blockdown.toml` from `dir`. A missing file is an empty config,
    /// not an error.
    pub fn load(dir: &Path) -> Result<Config, String> {
        let path = dir.join("blockdown.toml");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(format!("cannot read '{}': {}", path.display(), e)),
        };
        toml::from_str(&text).map_err(|e| format!("invalid '{}': {}", path.display(), e))
    }

    /// Load an explicitly named config file. Here a missing file is an error.
    pub fn load_file(path: &Path) -> Result<Config, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("invalid '{}': {}", path.display(), e))
    }

    /// Resolve the partials root against the directory the config (and
    /// template) lives in.
    pub fn templates_dir(&self, base: &Path) -> PathBuf {
        match &self.templates_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        }
    }
}

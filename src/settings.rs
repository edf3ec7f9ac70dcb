//! The YAML configuration document and Kaggle credentials.
//!
//! ```yaml
//! dataset:
//!   provider: kaggle
//!   slug: owner/some-dataset
//!   local_dir: data/some-dataset
//!   classes: [helmet, head]
//! training:
//!   model: yolov8s.pt
//!   epochs: 50
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Provider name that enables the download stage
pub const KAGGLE_PROVIDER: &str = "kaggle";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dataset: DatasetConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub provider: String,
    pub slug: Option<String>,
    pub local_dir: PathBuf,
    pub classes: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            slug: None,
            local_dir: PathBuf::from("data"),
            classes: Vec::new(),
        }
    }
}

impl DatasetConfig {
    /// Anything but "kaggle" means the dataset is already on disk.
    pub fn is_kaggle(&self) -> bool {
        self.provider == KAGGLE_PROVIDER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub model: String,
    pub imgsz: u32,
    pub batch: u32,
    pub epochs: u32,
    pub device: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model: "yolov8s.pt".to_string(),
            imgsz: 640,
            batch: 8,
            epochs: 50,
            device: "cpu".to_string(),
        }
    }
}

impl Settings {
    /// Read and parse a configuration file. An empty document yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Kaggle API credentials, passed explicitly to the fetcher.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("key", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: key.into(),
        }
    }

    /// Resolve credentials from, in order: the process environment, the env
    /// file, then `kaggle.json`. Returns `None` when no source has both values.
    ///
    /// A variable present in the process environment beats the env file.
    pub fn resolve(env_file: &Path) -> Result<Option<Self>> {
        let mut vars = load_env_file(env_file)?;
        for name in ["KAGGLE_USERNAME", "KAGGLE_KEY", "KAGGLE_CONFIG_DIR"] {
            if let Ok(value) = std::env::var(name) {
                vars.insert(name.to_string(), value);
            }
        }

        if let (Some(username), Some(key)) = (vars.get("KAGGLE_USERNAME"), vars.get("KAGGLE_KEY")) {
            return Ok(Some(Self::new(username.clone(), key.clone())));
        }

        let config_dir = vars
            .get("KAGGLE_CONFIG_DIR")
            .map(PathBuf::from)
            .or_else(default_kaggle_dir);
        match config_dir {
            Some(dir) => Self::from_kaggle_json(&dir.join("kaggle.json")),
            None => Ok(None),
        }
    }

    /// Parse a `kaggle.json` file (`{"username": .., "key": ..}`), if present.
    pub fn from_kaggle_json(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let credentials = serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to parse '{}': {}", path.display(), e),
            )
        })?;
        debug!("Using Kaggle credentials from {}", path.display());
        Ok(Some(credentials))
    }
}

/// `~/.kaggle`, where the Kaggle CLI keeps `kaggle.json`.
fn default_kaggle_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kaggle"))
}

/// Read `KEY=VALUE` lines from an env file. A missing file yields an empty map.
///
/// Blank lines, `#` comments and lines without `=` are skipped; matching quotes
/// around values are dropped. The first occurrence of a key wins.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }

    let content = fs::read_to_string(path)?;
    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value
            .trim()
            .trim_matches('\'')
            .trim_matches('"');
        if !key.is_empty() {
            vars.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
    }
    debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_kaggle_dir_is_under_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(default_kaggle_dir(), Some(home.join(".kaggle")));
        } else {
            assert_eq!(default_kaggle_dir(), None);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings.dataset.provider, "local");
        assert_eq!(settings.dataset.local_dir, PathBuf::from("data"));
        assert!(settings.dataset.classes.is_empty());
        assert_eq!(settings.training.imgsz, 640);
        assert_eq!(settings.training.batch, 8);
        assert_eq!(settings.training.epochs, 50);
        assert_eq!(settings.training.device, "cpu");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let yaml = "dataset:\n  provider: kaggle\n  slug: owner/helmets\n  classes: [helmet, head]\ntraining:\n  epochs: 5\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(settings.dataset.is_kaggle());
        assert_eq!(settings.dataset.slug.as_deref(), Some("owner/helmets"));
        assert_eq!(settings.dataset.classes, vec!["helmet", "head"]);
        assert_eq!(settings.training.epochs, 5);
        assert_eq!(settings.training.batch, 8);
    }

    #[test]
    fn test_load_missing_config() {
        let err = Settings::load(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_env_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".env");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# credentials").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "KAGGLE_USERNAME = 'alice'").unwrap();
        writeln!(file, "KAGGLE_KEY=\"s3cr=t\"").unwrap();
        writeln!(file, "not a pair").unwrap();
        writeln!(file, "KAGGLE_KEY=ignored").unwrap();

        let vars = load_env_file(&path).unwrap();
        assert_eq!(vars.get("KAGGLE_USERNAME").map(String::as_str), Some("alice"));
        assert_eq!(vars.get("KAGGLE_KEY").map(String::as_str), Some("s3cr=t"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_load_env_file_missing_is_empty() {
        let vars = load_env_file(Path::new("no/such/.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_kaggle_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("kaggle.json");
        fs::write(&path, r#"{"username": "bob", "key": "abc123"}"#).unwrap();
        let credentials = Credentials::from_kaggle_json(&path).unwrap().unwrap();
        assert_eq!(credentials, Credentials::new("bob", "abc123"));
        assert!(!format!("{credentials:?}").contains("abc123"));
    }
}

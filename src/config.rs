use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NoteboxError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted notes and theme
    pub data_dir: Option<PathBuf>,

    /// Editor command used when note content is not given on the command line
    pub editor_command: Option<String>,

    /// How many notes `recent` shows
    pub recent_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            editor_command: None,
            recent_count: 3,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "notebox")
}

impl Config {
    /// Loads the configuration from `path`, or from the platform config
    /// directory when no path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    debug!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(NoteboxError::ConfigError {
                    message: format!("cannot read {}: {}", path.display(), e),
                })
            }
        };

        let config: Config = serde_json::from_str(&raw).map_err(|e| NoteboxError::ConfigError {
            message: format!("invalid config file {}: {}", path.display(), e),
        })?;
        if config.recent_count == 0 {
            return Err(NoteboxError::ConfigError {
                message: "recent_count must be at least 1".to_string(),
            });
        }

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `<platform config dir>/config.json`
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// The data directory to use: the configured one, else the platform's.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| NoteboxError::ConfigError {
                message: "no data directory configured and no home directory found".to_string(),
            })
    }

    /// Editor to launch: the configured command, then `$VISUAL` or `$EDITOR`,
    /// then the first platform editor found on `PATH`. Blank values are skipped.
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = self.editor_command.as_deref().filter(|e| !e.trim().is_empty()) {
            return editor.to_string();
        }
        if let Some(editor) = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .ok()
            .filter(|e| !e.trim().is_empty())
        {
            return editor;
        }

        let candidates: &[&str] = if cfg!(windows) {
            &["notepad"]
        } else if cfg!(target_os = "macos") {
            &["nano", "vim", "vi"]
        } else {
            &["nano", "vim", "vi", "emacs"]
        };
        candidates
            .iter()
            .find(|editor| which(editor).is_ok())
            .unwrap_or(&candidates[0])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(&tmp.path().join("config.json"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.recent_count, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "editor_command": "code --wait" }"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.editor_command.as_deref(), Some("code --wait"));
        assert_eq!(config.get_editor_command(), "code --wait");
        assert_eq!(config.recent_count, 3);
    }

    #[test]
    fn blank_configured_editor_is_skipped() {
        let config = Config {
            editor_command: Some("   ".into()),
            ..Config::default()
        };
        assert!(!config.get_editor_command().trim().is_empty());
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(NoteboxError::ConfigError { .. })
        ));

        fs::write(&path, r#"{ "recent_count": 0 }"#).unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn configured_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/notes")),
            ..Config::default()
        };
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/tmp/notes"));
    }
}

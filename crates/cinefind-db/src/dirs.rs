//! Per-user cinefind directories.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Application directory name under the XDG base directories.
const APP_NAME: &str = "cinefind";

/// A cinefind directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// Holds `config.toml`.
    Config,
    /// Holds the database.
    Data,
}

impl AppDir {
    /// Resolves the directory.
    ///
    /// An explicit `dir` wins and is shared by every kind. Otherwise
    /// `$XDG_CONFIG_HOME` / `$XDG_DATA_HOME` is used when set to an absolute
    /// path, then `~/.config` / `~/.local/share`, each with `cinefind` appended.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and `HOME` is unset.
    pub fn resolve(self, dir: Option<&Path>) -> Result<PathBuf> {
        self.resolve_with(dir, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        self,
        dir: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<PathBuf> {
        if let Some(d) = dir {
            return Ok(d.to_path_buf());
        }

        let (xdg_var, home_suffix): (_, &[&str]) = match self {
            Self::Config => ("XDG_CONFIG_HOME", &[".config"]),
            Self::Data => ("XDG_DATA_HOME", &[".local", "share"]),
        };

        if let Some(base) = env(xdg_var)
            .map(PathBuf::from)
            .filter(|base| base.is_absolute())
        {
            return Ok(base.join(APP_NAME));
        }

        let Some(home) = env("HOME").filter(|h| !h.is_empty()) else {
            bail!("HOME environment variable is not set");
        };
        let mut path = PathBuf::from(home);
        path.extend(home_suffix);
        Ok(path.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_override_dir_is_shared() {
        // Arrange
        let dir = Path::new("/tmp/movies");
        let env = env_of(&[("HOME", "/home/u")]);

        // Act
        let config = AppDir::Config.resolve_with(Some(dir), &env).unwrap();
        let data = AppDir::Data.resolve_with(Some(dir), &env).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/tmp/movies"));
        assert_eq!(data, config);
    }

    #[test]
    fn test_home_defaults() {
        // Arrange
        let env = env_of(&[("HOME", "/home/u")]);

        // Act
        let config = AppDir::Config.resolve_with(None, &env).unwrap();
        let data = AppDir::Data.resolve_with(None, &env).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/home/u/.config/cinefind"));
        assert_eq!(data, PathBuf::from("/home/u/.local/share/cinefind"));
    }

    #[test]
    fn test_xdg_overrides_home() {
        // Arrange
        let env = env_of(&[
            ("HOME", "/home/u"),
            ("XDG_CONFIG_HOME", "/cfg"),
            ("XDG_DATA_HOME", "/data"),
        ]);

        // Act
        let config = AppDir::Config.resolve_with(None, &env).unwrap();
        let data = AppDir::Data.resolve_with(None, &env).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/cfg/cinefind"));
        assert_eq!(data, PathBuf::from("/data/cinefind"));
    }

    #[test]
    fn test_relative_xdg_is_ignored() {
        // Arrange
        let env = env_of(&[("HOME", "/home/u"), ("XDG_DATA_HOME", "data")]);

        // Act
        let data = AppDir::Data.resolve_with(None, &env).unwrap();

        // Assert
        assert_eq!(data, PathBuf::from("/home/u/.local/share/cinefind"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        // Arrange
        let env = env_of(&[]);

        // Act
        let result = AppDir::Config.resolve_with(None, &env);

        // Assert
        assert!(result.unwrap_err().to_string().contains("HOME"));
    }
}

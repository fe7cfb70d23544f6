//! Configuration file loading and settings resolution.
//!
//! Settings come from three layers, highest priority first: command-line
//! options, environment variables, and the TOML config file at
//! `$XDG_CONFIG_HOME/dotfiles/config.toml` (or `--config`). A missing config
//! file is not an error.
//!
//! ```toml
//! store = "~/dotfiles"
//! user = "alice"
//! ignore_marker = ".dotfiles-ignore"
//! entries = ["~/.bashrc", "~/.config/nvim"]
//!
//! [vars]
//! editor = "nvim"
//! ```
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::error::ConfigError;
use crate::flags::Flags;
use crate::fs::current_user;
use crate::paths::DEFAULT_IGNORE_MARKER;

/// Contents of the config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Store directory.
    pub store: Option<PathBuf>,
    /// Home directory.
    pub home: Option<PathBuf>,
    /// Owner of copied files.
    pub user: Option<String>,
    /// Name of the marker written into linked directories.
    pub ignore_marker: Option<String>,
    /// Entries processed when none are given on the command line.
    pub entries: Vec<String>,
    /// Template variables.
    pub vars: BTreeMap<String, String>,
}

/// Load `path`, returning an empty config when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::InvalidSyntax {
        file: path.display().to_string(),
        message: e.message().to_string(),
    })
}

/// Default config file location.
pub fn default_path(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("dotfiles").join("config.toml"))
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Store directory.
    pub store: PathBuf,
    /// Home directory.
    pub home: PathBuf,
    /// Owner of copied files.
    pub user: String,
    /// Name of the marker written into linked directories.
    pub ignore_marker: String,
    /// Entries from the config file.
    pub entries: Vec<String>,
    /// Run options, including template variables.
    pub flags: Flags,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is invalid or a required value
    /// cannot be determined.
    pub fn from_env(global: &GlobalOpts) -> Result<Self, ConfigError> {
        Self::resolve(global, |key| std::env::var(key).ok())
    }

    /// Resolve settings with `env` standing in for environment lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is invalid or a required value
    /// cannot be determined.
    pub fn resolve(
        global: &GlobalOpts,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match global.config.clone().or_else(|| default_path(&env)) {
            Some(path) => load(&path)?,
            None => FileConfig::default(),
        };
        Self::from_parts(global, file, env)
    }

    /// Merge command-line options, environment and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if a `--var` is malformed or the home directory or
    /// owner cannot be determined.
    pub fn from_parts(
        global: &GlobalOpts,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env_home = env("HOME").map(PathBuf::from);
        let home = global
            .home
            .clone()
            .or_else(|| file.home.clone())
            .or_else(|| env_home.clone())
            .ok_or(ConfigError::MissingHome)?;
        let home = expand_tilde(&home, env_home.as_deref().unwrap_or(&home));

        let store = global
            .root
            .clone()
            .or_else(|| env("DOTFILES_ROOT").map(PathBuf::from))
            .or_else(|| file.store.as_deref().map(|s| expand_tilde(s, &home)))
            .unwrap_or_else(|| home.join("dotfiles"));

        let user = global
            .user
            .clone()
            .or_else(|| file.user.clone())
            .or_else(|| env("SUDO_USER"))
            .or_else(|| env("USER"))
            .or_else(current_user)
            .ok_or(ConfigError::MissingUser)?;

        let mut vars = BTreeMap::from([
            ("user".to_string(), user.clone()),
            ("home".to_string(), home.display().to_string()),
            ("store".to_string(), store.display().to_string()),
        ]);
        vars.extend(file.vars);
        for raw in &global.vars {
            let (key, value) = parse_var(raw)?;
            vars.insert(key, value);
        }

        Ok(Self {
            flags: Flags {
                yes: global.yes,
                no: global.no,
                force: global.force,
                no_remove: global.no_remove,
                dry_run: global.dry_run,
                vars,
            },
            ignore_marker: file
                .ignore_marker
                .unwrap_or_else(|| DEFAULT_IGNORE_MARKER.to_string()),
            entries: file.entries,
            store,
            home,
            user,
        })
    }
}

/// Split a `KEY=VALUE` argument.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidVariable`] if there is no `=` or the key is empty.
pub fn parse_var(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidVariable(raw.to_string())),
    }
}

fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn loads_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
store = "~/dots"
user = "alice"
ignore_marker = ".keep-whole"
entries = ["~/.bashrc"]

[vars]
editor = "nvim"
"#,
        )
        .unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.store, Some(PathBuf::from("~/dots")));
        assert_eq!(config.entries, vec!["~/.bashrc"]);
        assert_eq!(config.vars.get("editor").map(String::as_str), Some("nvim"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "stroe = \"/x\"\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }

    #[test]
    fn defaults_follow_environment() {
        let env = env_of(&[("HOME", "/home/alice"), ("USER", "alice")]);
        let settings = Settings::from_parts(&GlobalOpts::default(), FileConfig::default(), env)
            .unwrap();
        assert_eq!(settings.home, PathBuf::from("/home/alice"));
        assert_eq!(settings.store, PathBuf::from("/home/alice/dotfiles"));
        assert_eq!(settings.user, "alice");
        assert_eq!(settings.ignore_marker, DEFAULT_IGNORE_MARKER);
    }

    #[test]
    fn sudo_user_wins_over_user() {
        let env = env_of(&[("HOME", "/root"), ("USER", "root"), ("SUDO_USER", "alice")]);
        let settings = Settings::from_parts(&GlobalOpts::default(), FileConfig::default(), env)
            .unwrap();
        assert_eq!(settings.user, "alice");
    }

    #[test]
    fn store_priority() {
        let env = env_of(&[("HOME", "/home/alice"), ("USER", "alice"), ("DOTFILES_ROOT", "/env")]);
        let file = FileConfig {
            store: Some(PathBuf::from("~/from-file")),
            ..FileConfig::default()
        };
        let from_env = Settings::from_parts(&GlobalOpts::default(), file.clone(), &env).unwrap();
        assert_eq!(from_env.store, PathBuf::from("/env"));

        let global = GlobalOpts {
            root: Some(PathBuf::from("/cli")),
            ..GlobalOpts::default()
        };
        let from_cli = Settings::from_parts(&global, file.clone(), &env).unwrap();
        assert_eq!(from_cli.store, PathBuf::from("/cli"));

        let no_env = env_of(&[("HOME", "/home/alice"), ("USER", "alice")]);
        let from_file = Settings::from_parts(&GlobalOpts::default(), file, no_env).unwrap();
        assert_eq!(from_file.store, PathBuf::from("/home/alice/from-file"));
    }

    #[test]
    fn missing_home_is_an_error() {
        let env = env_of(&[("USER", "alice")]);
        let err = Settings::from_parts(&GlobalOpts::default(), FileConfig::default(), env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingHome));
    }

    #[test]
    fn variables_layer_builtins_file_and_cli() {
        let env = env_of(&[("HOME", "/home/alice"), ("USER", "alice")]);
        let file = FileConfig {
            vars: BTreeMap::from([
                ("editor".to_string(), "vi".to_string()),
                ("shell".to_string(), "bash".to_string()),
            ]),
            ..FileConfig::default()
        };
        let global = GlobalOpts {
            vars: vec!["editor=nvim".to_string()],
            yes: true,
            ..GlobalOpts::default()
        };
        let settings = Settings::from_parts(&global, file, env).unwrap();
        let vars = &settings.flags.vars;
        assert_eq!(vars["editor"], "nvim");
        assert_eq!(vars["shell"], "bash");
        assert_eq!(vars["user"], "alice");
        assert_eq!(vars["store"], "/home/alice/dotfiles");
        assert!(settings.flags.yes);
    }

    #[test]
    fn parse_var_rejects_malformed() {
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=value").is_err());
        assert_eq!(
            parse_var("url=a=b").unwrap(),
            ("url".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn default_path_prefers_xdg() {
        let env = env_of(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/alice")]);
        assert_eq!(
            default_path(env),
            Some(PathBuf::from("/xdg/dotfiles/config.toml"))
        );
        let env = env_of(&[("HOME", "/home/alice")]);
        assert_eq!(
            default_path(env),
            Some(PathBuf::from("/home/alice/.config/dotfiles/config.toml"))
        );
    }
}

//! Configuration management for Flowdeck.
//!
//! Handles loading configuration from TOML files and applying environment
//! overrides. Nothing here is global: the resolved [`StoreLayout`] is handed to
//! the project store at construction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the root directory.
pub const ROOT_ENV: &str = "FLOWDECK_ROOT";

/// Environment variable overriding the author identity.
pub const AUTHOR_ENV: &str = "FLOWDECK_AUTHOR";

/// Local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = ".flowdeck.toml";

/// Author used when no identity can be derived from the environment.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings
    pub storage: StorageConfig,

    /// Author identity settings
    pub author: AuthorConfig,

    /// Git publishing settings
    pub git: GitConfig,

    /// Template discovery data store
    pub templates: TemplatesConfig,
}

/// Where project records live and how they are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding `projects/` and `workflows/` (`~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Write each artifact to a temp file and rename it into place
    pub atomic_writes: bool,
}

/// Author identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    /// Author name stamped on new records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email used for commit signatures when git has no identity configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Git publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name to register and push to
    pub remote: String,

    /// Branch to publish
    pub branch: String,
}

/// Template discovery data store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Data store base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Anonymous API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: None, atomic_writes: true }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { remote: "origin".to_string(), branch: "main".to_string() }
    }
}

/// Directory layout of a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    /// Root directory (the git working tree)
    pub root: PathBuf,
    /// `<root>/projects`: one record and one README per project
    pub projects_dir: PathBuf,
    /// `<root>/workflows`: one workflow export per project
    pub workflows_dir: PathBuf,
}

impl StoreLayout {
    /// Derive the layout for a root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self { projects_dir: root.join("projects"), workflows_dir: root.join("workflows"), root }
    }

    /// Path of the record document for a project.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.projects_dir.join(format!("{name}.json"))
    }

    /// Path of the README for a project.
    pub fn readme_path(&self, name: &str) -> PathBuf {
        self.projects_dir.join(format!("{name}.md"))
    }

    /// Path of a workflow export for a project.
    pub fn export_path(&self, name: &str, extension: &str) -> PathBuf {
        self.workflows_dir.join(format!("{name}.{extension}"))
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Looks for config in:
    /// 1. `.flowdeck.toml` in current directory
    /// 2. `~/.config/flowdeck/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("flowdeck"))
    }

    /// Resolve the root directory.
    ///
    /// Precedence: `FLOWDECK_ROOT`, the configured root, `~/Projects/n8n`, and
    /// `./n8n` when no home directory is known.
    pub fn root_dir(&self) -> PathBuf {
        if let Some(root) = non_empty_env(ROOT_ENV) {
            return expand_path(&root);
        }
        if let Some(root) = &self.storage.root {
            return expand_path(root);
        }
        default_root()
    }

    /// Resolve the author identity.
    ///
    /// Precedence: `FLOWDECK_AUTHOR`, the configured name, `USER`, `USERNAME`,
    /// then `"unknown"`.
    pub fn author_name(&self) -> String {
        non_empty_env(AUTHOR_ENV)
            .or_else(|| self.author.name.clone().filter(|n| !n.trim().is_empty()))
            .or_else(|| non_empty_env("USER"))
            .or_else(|| non_empty_env("USERNAME"))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    /// Email for commit signatures.
    pub fn author_email(&self) -> String {
        self.author.email.clone().unwrap_or_else(|| format!("{}@localhost", self.author_name()))
    }

    /// Resolve the template store URL (`SUPABASE_URL` wins).
    pub fn templates_url(&self) -> Option<String> {
        non_empty_env("SUPABASE_URL").or_else(|| self.templates.url.clone())
    }

    /// Resolve the template store key (`SUPABASE_ANON_KEY` wins).
    pub fn templates_key(&self) -> Option<String> {
        non_empty_env("SUPABASE_ANON_KEY").or_else(|| self.templates.anon_key.clone())
    }

    /// Layout derived from the resolved root directory.
    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(self.root_dir())
    }
}

/// Default root directory.
pub fn default_root() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from("n8n"), |home| home.join("Projects").join("n8n"))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.atomic_writes);
        assert!(config.storage.root.is_none());
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.branch, "main");
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [storage]
            root = "/srv/flows"
            atomic_writes = false

            [author]
            name = "Dana"

            [git]
            branch = "trunk"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.root.as_deref(), Some("/srv/flows"));
        assert!(!config.storage.atomic_writes);
        assert_eq!(config.author.name.as_deref(), Some("Dana"));
        assert_eq!(config.git.branch, "trunk");
        assert_eq!(config.git.remote, "origin");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[git]"));
    }

    #[test]
    fn test_layout_paths() {
        let layout = StoreLayout::new("/data/n8n");
        assert_eq!(layout.projects_dir, PathBuf::from("/data/n8n/projects"));
        assert_eq!(layout.workflows_dir, PathBuf::from("/data/n8n/workflows"));
        assert_eq!(layout.record_path("demo"), PathBuf::from("/data/n8n/projects/demo.json"));
        assert_eq!(layout.readme_path("demo"), PathBuf::from("/data/n8n/projects/demo.md"));
        assert_eq!(
            layout.export_path("demo", "yaml"),
            PathBuf::from("/data/n8n/workflows/demo.yaml")
        );
    }

    #[test]
    #[serial]
    fn test_root_env_override() {
        std::env::set_var(ROOT_ENV, "/tmp/flowdeck-root");
        let mut config = Config::default();
        config.storage.root = Some("/elsewhere".to_string());
        assert_eq!(config.root_dir(), PathBuf::from("/tmp/flowdeck-root"));
        std::env::remove_var(ROOT_ENV);

        assert_eq!(config.root_dir(), PathBuf::from("/elsewhere"));
    }

    #[test]
    #[serial]
    fn test_root_falls_back_to_default() {
        std::env::remove_var(ROOT_ENV);
        let config = Config::default();
        assert_eq!(config.root_dir(), default_root());
    }

    #[test]
    #[serial]
    fn test_author_precedence() {
        std::env::set_var(AUTHOR_ENV, "from-env");
        let mut config = Config::default();
        config.author.name = Some("from-config".to_string());
        assert_eq!(config.author_name(), "from-env");

        std::env::remove_var(AUTHOR_ENV);
        assert_eq!(config.author_name(), "from-config");
    }

    #[test]
    #[serial]
    fn test_author_falls_back_to_unknown() {
        let saved_user = std::env::var("USER").ok();
        let saved_username = std::env::var("USERNAME").ok();
        std::env::remove_var(AUTHOR_ENV);
        std::env::remove_var("USER");
        std::env::remove_var("USERNAME");

        assert_eq!(Config::default().author_name(), UNKNOWN_AUTHOR);

        if let Some(user) = saved_user {
            std::env::set_var("USER", user);
        }
        if let Some(username) = saved_username {
            std::env::set_var("USERNAME", username);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nroot = \"~/flows\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.storage.root.as_deref(), Some("~/flows"));
        assert!(config.storage.atomic_writes);
    }
}

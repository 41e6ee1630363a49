use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_API_PASS, DEFAULT_API_USER, DEFAULT_GREETING, DEFAULT_TABLE,
    HTTP_REQUEST_TIMEOUT_SECS,
};

const ENV_PREFIX: &str = "PINTERPAL_";
const LOCAL_CONFIG: &str = ".pinterpal/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Recommendation service connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Widget behaviour
    #[serde(default)]
    pub widget: WidgetConfig,
}

/// Recommendation service connection
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Basic-auth user
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// Per-request deadline
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            username: DEFAULT_API_USER.to_string(),
            password: DEFAULT_API_PASS.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Widget behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Product table the service searches
    pub table: String,
    /// First bot bubble when the panel opens
    pub greeting: String,
    /// Boot the conversation as soon as the TUI opens
    pub auto_open: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            auto_open: true,
        }
    }
}

/// Values given on the command line; they beat every file and env layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub table: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(username) = &self.username {
            config.api.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.api.password = password.clone();
        }
        if let Some(table) = &self.table {
            config.widget.table = table.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.api.timeout_secs = timeout_secs;
        }
    }
}

/// Layer defaults, config files and `PINTERPAL_` env vars.
/// An explicit file replaces the global and local files.
fn figment(global: Option<&Path>, local: &Path, explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match explicit {
        Some(path) => {
            figment = figment.merge(Toml::file(path));
        }
        None => {
            if let Some(global) = global.filter(|p| p.exists()) {
                figment = figment.merge(Toml::file(global));
            }
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

impl Config {
    /// Apply command-line values and normalise the base URL
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        overrides.apply(&mut self);
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        self
    }
}

/// Load configuration from multiple sources
pub fn load_config(overrides: &ConfigOverrides) -> Result<Config> {
    if let Some(path) = &overrides.config_file {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }

    let global = get_config_dir().ok().map(|dir| dir.join("config.toml"));
    let config: Config = figment(
        global.as_deref(),
        Path::new(LOCAL_CONFIG),
        overrides.config_file.as_deref(),
    )
    .extract()
    .context("Failed to load configuration")?;

    Ok(config.with_overrides(overrides))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pinterpal") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("pinterpal");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

const LOCAL_EXAMPLE: &str = r#"# PinterPal project configuration
# Values here override the global config; PINTERPAL_* env vars override both.

[api]
base_url = "http://127.0.0.1:8003"
timeout_secs = 20

[widget]
table = "wijnen"
auto_open = true
"#;

/// Create the default global file and a local example, leaving existing files alone.
/// Returns the files that were written.
pub fn init_config() -> Result<Vec<PathBuf>> {
    let global = get_config_dir()?.join("config.toml");
    init_config_at(&global, Path::new(".pinterpal/config.toml.example"))
}

fn init_config_at(global: &Path, local_example: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if !global.exists() {
        save_config(&Config::default(), Some(global.to_path_buf()))?;
        written.push(global.to_path_buf());
    }

    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(local_example, LOCAL_EXAMPLE)?;
        written.push(local_example.to_path_buf());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn make_dir(jail: &Jail, name: &str) -> figment::error::Result<()> {
        std::fs::create_dir_all(jail.directory().join(name)).map_err(|e| e.to_string().into())
    }

    fn extract(jail_figment: Figment) -> figment::error::Result<Config> {
        jail_figment.extract()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8003");
        assert_eq!(config.api.timeout_secs, 20);
        assert_eq!(config.widget.table, "wijnen");
        assert!(config.widget.auto_open);
    }

    #[test]
    fn test_layer_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "global.toml",
                r#"
                [api]
                base_url = "http://global.test"
                username = "global"
                [widget]
                table = "bieren"
                "#,
            )?;
            make_dir(jail, ".pinterpal")?;
            jail.create_file(
                ".pinterpal/config.toml",
                r#"
                [api]
                base_url = "http://local.test/"
                "#,
            )?;
            jail.set_env("PINTERPAL_WIDGET__TABLE", "kazen");

            let config = extract(figment(
                Some(Path::new("global.toml")),
                Path::new(LOCAL_CONFIG),
                None,
            ))?;
            assert_eq!(config.api.username, "global");
            assert_eq!(config.api.base_url, "http://local.test/");
            assert_eq!(config.widget.table, "kazen");
            assert_eq!(config.api.password, "secret");

            let overrides = ConfigOverrides {
                table: Some("wijnen".into()),
                timeout_secs: Some(5),
                ..Default::default()
            };
            let config = config.with_overrides(&overrides);
            assert_eq!(config.widget.table, "wijnen");
            assert_eq!(config.api.timeout_secs, 5);
            assert_eq!(config.api.base_url, "http://local.test");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_replaces_discovered_files() {
        Jail::expect_with(|jail| {
            make_dir(jail, ".pinterpal")?;
            jail.create_file(".pinterpal/config.toml", "[widget]\ntable = \"lokaal\"\n")?;
            jail.create_file("custom.toml", "[api]\nusername = \"demo\"\n")?;

            let config = extract(figment(
                None,
                Path::new(LOCAL_CONFIG),
                Some(Path::new("custom.toml")),
            ))?;
            assert_eq!(config.api.username, "demo");
            assert_eq!(config.widget.table, "wijnen");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "[api\nbase_url = ")?;
            let result = extract(figment(None, Path::new(LOCAL_CONFIG), Some(Path::new("broken.toml"))));
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.widget.table = "bieren".into();
        save_config(&config, Some(path.clone())).unwrap();

        let loaded: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let example = dir.path().join(".pinterpal").join("config.toml.example");

        let written = init_config_at(&global, &example).unwrap();
        assert_eq!(written, vec![global.clone(), example.clone()]);

        std::fs::write(&global, "[widget]\ntable = \"eigen\"\n").unwrap();
        assert!(init_config_at(&global, &example).unwrap().is_empty());
        assert!(std::fs::read_to_string(&global).unwrap().contains("eigen"));
    }

    #[test]
    fn test_password_is_masked_in_debug() {
        let rendered = format!("{:?}", Config::default());
        assert!(!rendered.contains("secret"));
    }
}

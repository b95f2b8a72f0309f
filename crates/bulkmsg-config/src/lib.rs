use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bulkmsg_core::{
    EngineOptions, DEFAULT_DATA_SHEETS, DEFAULT_LMS_THRESHOLD, DEFAULT_PREVIEW_LIMIT,
    DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_SHEETS,
};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "bulkmsg";
const CONFIG_FILENAME: &str = "config.toml";

pub const MAX_PREVIEW_LIMIT: i64 = 50;
pub const MAX_LMS_THRESHOLD: i64 = 2000;
pub const DEFAULT_BASE_URL: &str = "https://api.solapi.com";
pub const DEFAULT_API_KEY_ENV: &str = "SOLAPI_API_KEY";
pub const DEFAULT_API_SECRET_ENV: &str = "SOLAPI_API_SECRET";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Default sender number when the command line gives none.
    pub sender: Option<String>,
    pub preview_limit: usize,
    pub lms_threshold: usize,
    pub template: TemplateConfig,
    pub delivery: DeliveryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    pub sheets: Vec<String>,
    pub data_sheets: Vec<String>,
    pub default_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub provider: DeliveryProvider,
    pub base_url: String,
    pub api_key_env: String,
    pub api_secret_env: String,
    pub timeout_seconds: u64,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryProvider {
    DryRun,
    Solapi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Overrides `$XDG_DATA_HOME/bulkmsg/objects`.
    pub dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sender: None,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            lms_threshold: DEFAULT_LMS_THRESHOLD,
            template: TemplateConfig {
                sheets: DEFAULT_TEMPLATE_SHEETS.map(String::from).to_vec(),
                data_sheets: DEFAULT_DATA_SHEETS.map(String::from).to_vec(),
                default_text: DEFAULT_TEMPLATE.to_string(),
            },
            delivery: DeliveryConfig {
                provider: DeliveryProvider::DryRun,
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key_env: DEFAULT_API_KEY_ENV.to_string(),
                api_secret_env: DEFAULT_API_SECRET_ENV.to_string(),
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                subject: None,
            },
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            template_sheets: self.template.sheets.clone(),
            data_sheets: self.template.data_sheets.clone(),
            default_template: self.template.default_text.clone(),
            preview_limit: self.preview_limit,
            lms_threshold: self.lms_threshold,
            subject: self.delivery.subject.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid preview_limit value: {0}")]
    InvalidPreviewLimit(i64),
    #[error("invalid lms_threshold value: {0}")]
    InvalidLmsThreshold(i64),
    #[error("invalid delivery.timeout_seconds value: {0}")]
    InvalidTimeout(u64),
    #[error("invalid delivery.base_url value: {0}")]
    InvalidBaseUrl(String),
    #[error("{0} must list at least one sheet name")]
    EmptySheetList(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    sender: Option<String>,
    preview_limit: Option<i64>,
    lms_threshold: Option<i64>,
    template: Option<TemplateFile>,
    delivery: Option<DeliveryFile>,
    storage: Option<StorageFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    sheets: Option<Vec<String>>,
    data_sheets: Option<Vec<String>>,
    default_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeliveryFile {
    provider: Option<DeliveryProvider>,
    base_url: Option<String>,
    api_key_env: Option<String>,
    api_secret_env: Option<String>,
    timeout_seconds: Option<u64>,
    subject: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageFile {
    dir: Option<PathBuf>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    config.sender = parsed
        .sender
        .map(|sender| sender.trim().to_string())
        .filter(|sender| !sender.is_empty());

    if let Some(limit) = parsed.preview_limit {
        if !(1..=MAX_PREVIEW_LIMIT).contains(&limit) {
            return Err(ConfigError::InvalidPreviewLimit(limit));
        }
        config.preview_limit = limit as usize;
    }

    if let Some(threshold) = parsed.lms_threshold {
        if !(1..=MAX_LMS_THRESHOLD).contains(&threshold) {
            return Err(ConfigError::InvalidLmsThreshold(threshold));
        }
        config.lms_threshold = threshold as usize;
    }

    if let Some(template) = parsed.template {
        if let Some(sheets) = template.sheets {
            config.template.sheets = non_empty_sheets(sheets, "template.sheets")?;
        }
        if let Some(sheets) = template.data_sheets {
            config.template.data_sheets = non_empty_sheets(sheets, "template.data_sheets")?;
        }
        if let Some(text) = template.default_text.filter(|text| !text.trim().is_empty()) {
            config.template.default_text = text;
        }
    }

    if let Some(delivery) = parsed.delivery {
        if let Some(provider) = delivery.provider {
            config.delivery.provider = provider;
        }
        if let Some(base_url) = delivery.base_url {
            let trimmed = base_url.trim().trim_end_matches('/');
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::InvalidBaseUrl(base_url));
            }
            config.delivery.base_url = trimmed.to_string();
        }
        if let Some(name) = delivery.api_key_env {
            config.delivery.api_key_env = name;
        }
        if let Some(name) = delivery.api_secret_env {
            config.delivery.api_secret_env = name;
        }
        if let Some(timeout) = delivery.timeout_seconds {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.delivery.timeout_seconds = timeout;
        }
        config.delivery.subject = delivery
            .subject
            .map(|subject| subject.trim().to_string())
            .filter(|subject| !subject.is_empty());
    }

    if let Some(storage) = parsed.storage {
        config.storage.dir = storage.dir.filter(|dir| !dir.as_os_str().is_empty());
    }

    Ok(config)
}

fn non_empty_sheets(sheets: Vec<String>, key: &'static str) -> Result<Vec<String>> {
    let sheets: Vec<String> = sheets
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if sheets.is_empty() {
        return Err(ConfigError::EmptySheetList(key));
    }
    Ok(sheets)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, ConfigError, ConfigFile, DeliveryFile, DeliveryProvider,
        TemplateFile, DEFAULT_BASE_URL,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            sender: Some(" 02-123-4567 ".to_string()),
            preview_limit: Some(10),
            lms_threshold: Some(80),
            template: Some(TemplateFile {
                sheets: Some(vec!["안내문".to_string()]),
                ..TemplateFile::default()
            }),
            delivery: Some(DeliveryFile {
                provider: Some(DeliveryProvider::Solapi),
                base_url: Some("https://sandbox.example/".to_string()),
                subject: Some("주문 안내".to_string()),
                ..DeliveryFile::default()
            }),
            storage: None,
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.sender.as_deref(), Some("02-123-4567"));
        assert_eq!(merged.preview_limit, 10);
        assert_eq!(merged.lms_threshold, 80);
        assert_eq!(merged.template.sheets, vec!["안내문"]);
        assert_eq!(merged.delivery.provider, DeliveryProvider::Solapi);
        assert_eq!(merged.delivery.base_url, "https://sandbox.example");

        let options = merged.engine_options();
        assert_eq!(options.preview_limit, 10);
        assert_eq!(options.subject.as_deref(), Some("주문 안내"));
    }

    #[test]
    fn merge_config_defaults_to_dry_run() {
        let merged = merge_config(ConfigFile::default()).expect("merge");
        assert_eq!(merged.delivery.provider, DeliveryProvider::DryRun);
        assert_eq!(merged.delivery.base_url, DEFAULT_BASE_URL);
        assert_eq!(merged.preview_limit, 5);
        assert_eq!(merged.lms_threshold, 90);
    }

    #[test]
    fn merge_config_rejects_out_of_range_values() {
        let err = merge_config(ConfigFile {
            preview_limit: Some(0),
            ..ConfigFile::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPreviewLimit(0)));

        let err = merge_config(ConfigFile {
            template: Some(TemplateFile {
                data_sheets: Some(vec!["  ".to_string()]),
                ..TemplateFile::default()
            }),
            ..ConfigFile::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptySheetList("template.data_sheets")));

        let err = merge_config(ConfigFile {
            delivery: Some(DeliveryFile {
                base_url: Some("api.solapi.com".to_string()),
                ..DeliveryFile::default()
            }),
            ..ConfigFile::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "sender = \"0212345678\"\n[delivery]\nprovider = \"solapi\"\ntimeout_seconds = 10\n[storage]\ndir = \"/tmp/objects\"\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.sender.as_deref(), Some("0212345678"));
        assert_eq!(config.delivery.provider, DeliveryProvider::Solapi);
        assert_eq!(config.delivery.timeout_seconds, 10);
        assert_eq!(
            config.storage.dir.as_deref(),
            Some(Path::new("/tmp/objects"))
        );
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "senders = \"0212345678\"\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

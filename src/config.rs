use crate::errors::{AppError, AppResult};
use crate::models::DEFAULT_METRIC_TYPES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const STORE_URI_ENV: &str = "GOAL_DASHBOARD_STORE_URI";
pub const SECRETS_FILE_NAME: &str = "secrets.yaml";
pub const KEYRING_SERVICE: &str = "goal-dashboard";
pub const KEYRING_USER: &str = "store-uri";
pub const DEFAULT_DATABASE_NAME: &str = "goal_tracker";
pub const DEFAULT_GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub database_name: String,
    pub grid_columns: usize,
    pub metric_types: Vec<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            grid_columns: DEFAULT_GRID_COLUMNS,
            metric_types: DEFAULT_METRIC_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    uri: Option<String>,
    mongo: Option<MongoSecrets>,
    dashboard: Option<DashboardSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct MongoSecrets {
    uri: Option<String>,
}

impl SecretsFile {
    fn store_uri(&self) -> Option<String> {
        self.uri
            .clone()
            .or_else(|| self.mongo.as_ref().and_then(|mongo| mongo.uri.clone()))
            .filter(|uri| !uri.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriSource {
    Environment,
    SecretsFile,
    Keyring,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub store_uri: String,
    pub uri_source: UriSource,
    pub settings: DashboardSettings,
}

impl DashboardConfig {
    pub fn load(app_data_dir: &Path) -> AppResult<Self> {
        let secrets = read_secrets_file(&app_data_dir.join(SECRETS_FILE_NAME))?;
        let env_uri = std::env::var(STORE_URI_ENV).ok();
        Self::resolve(env_uri, secrets, load_keyring_store_uri)
    }

    fn resolve(
        env_uri: Option<String>,
        secrets: SecretsFile,
        keyring_lookup: impl FnOnce() -> AppResult<Option<String>>,
    ) -> AppResult<Self> {
        let settings = secrets.dashboard.clone().unwrap_or_default();

        let (store_uri, uri_source) = if let Some(uri) = env_uri.filter(|uri| !uri.trim().is_empty()) {
            (uri, UriSource::Environment)
        } else if let Some(uri) = secrets.store_uri() {
            (uri, UriSource::SecretsFile)
        } else if let Some(uri) = keyring_lookup()?.filter(|uri| !uri.trim().is_empty()) {
            (uri, UriSource::Keyring)
        } else {
            return Err(AppError::StorageUnavailable(format!(
                "No store connection string configured. Set {}, add `uri` to {}, or save one from the app.",
                STORE_URI_ENV, SECRETS_FILE_NAME
            )));
        };

        tracing::debug!(source = ?uri_source, "store connection string resolved");
        Ok(Self {
            store_uri,
            uri_source,
            settings,
        })
    }
}

fn read_secrets_file(path: &Path) -> AppResult<SecretsFile> {
    if !path.is_file() {
        return Ok(SecretsFile::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|error| AppError::Config(format!("cannot read {}: {}", path.display(), error)))?;
    if raw.trim().is_empty() {
        return Ok(SecretsFile::default());
    }
    Ok(serde_yaml::from_str::<SecretsFile>(&raw)?)
}

fn store_uri_entry() -> AppResult<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(|error| AppError::Config(error.to_string()))
}

fn load_keyring_store_uri() -> AppResult<Option<String>> {
    let entry = match store_uri_entry() {
        Ok(entry) => entry,
        Err(error) => {
            tracing::warn!(error = %error, "keyring unavailable");
            return Ok(None);
        }
    };
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(error) => {
            tracing::warn!(error = %error, "keyring lookup failed");
            Ok(None)
        }
    }
}

pub fn save_store_uri(uri: &str) -> AppResult<()> {
    store_uri_entry()?
        .set_password(uri.trim())
        .map_err(|error| AppError::Config(error.to_string()))
}

pub fn clear_store_uri() -> AppResult<()> {
    match store_uri_entry()?.delete_credential() {
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(error) => Err(AppError::Config(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_secrets_file, DashboardConfig, SecretsFile, UriSource, DEFAULT_GRID_COLUMNS};
    use crate::errors::AppError;
    use std::fs;

    fn no_keyring() -> crate::errors::AppResult<Option<String>> {
        Ok(None)
    }

    #[test]
    fn environment_wins_over_secrets_file() {
        let secrets: SecretsFile = serde_yaml::from_str("uri: 'sqlite::memory:'").expect("yaml");
        let config = DashboardConfig::resolve(Some("mongodb://env-host".to_string()), secrets, no_keyring)
            .expect("config");
        assert_eq!(config.store_uri, "mongodb://env-host");
        assert_eq!(config.uri_source, UriSource::Environment);
    }

    #[test]
    fn nested_mongo_section_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secrets.yaml");
        fs::write(
            &path,
            "mongo:\n  uri: mongodb+srv://cluster0.example.net\ndashboard:\n  grid_columns: 4\n",
        )
        .expect("write secrets");

        let secrets = read_secrets_file(&path).expect("read");
        let config = DashboardConfig::resolve(None, secrets, no_keyring).expect("config");
        assert_eq!(config.store_uri, "mongodb+srv://cluster0.example.net");
        assert_eq!(config.uri_source, UriSource::SecretsFile);
        assert_eq!(config.settings.grid_columns, 4);
        assert_eq!(config.settings.database_name, "goal_tracker");
    }

    #[test]
    fn keyring_is_the_last_resort() {
        let config = DashboardConfig::resolve(Some("  ".to_string()), SecretsFile::default(), || {
            Ok(Some("sqlite:///tmp/goals.sqlite".to_string()))
        })
        .expect("config");
        assert_eq!(config.uri_source, UriSource::Keyring);
        assert_eq!(config.settings.grid_columns, DEFAULT_GRID_COLUMNS);
    }

    #[test]
    fn missing_uri_is_storage_unavailable() {
        let error = DashboardConfig::resolve(None, SecretsFile::default(), no_keyring).expect_err("no uri");
        assert!(matches!(error, AppError::StorageUnavailable(_)));
    }

    #[test]
    fn malformed_secrets_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secrets.yaml");
        fs::write(&path, "uri: [unterminated").expect("write secrets");
        assert!(matches!(read_secrets_file(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn absent_secrets_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = read_secrets_file(&dir.path().join("missing.yaml")).expect("read");
        assert!(secrets.store_uri().is_none());
    }
}

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::connection::ConnectionSettings;
use crate::error::ApiError;
use crate::service::credentials::{DEFAULT_PASSWORD_LEN, IdentifierPolicy};

/// Host every operation targets unless a request names another one.
pub const DEFAULT_SERVICE_HOST: &str = "localhost";

/// Service configuration.
///
/// Resolution order: built-in defaults, then `config.toml` in the working
/// directory (optional), then `MYSQLAPI_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,

    pub admin_user: String,
    pub admin_password: Option<String>,
    pub admin_port: u16,

    /// Host handed to tenants in create-database responses.
    pub database_host: Option<String>,

    /// `None` or `0` lifts the account-name length cap.
    pub username_max_len: Option<usize>,
    pub username_suffix_len: usize,
    pub password_len: usize,

    pub mysqldump_path: String,

    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_endpoint: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            admin_user: "root".to_string(),
            admin_password: None,
            admin_port: 3306,
            database_host: None,
            username_max_len: Some(16),
            username_suffix_len: 4,
            password_len: DEFAULT_PASSWORD_LEN,
            mysqldump_path: "mysqldump".to_string(),
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: None,
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MYSQLAPI_"))
    }

    pub fn load() -> Result<Self, ApiError> {
        Ok(Self::figment().extract()?)
    }

    /// Administrative session parameters for `host`, keeping the configured credentials.
    pub fn connection_settings(&self, host: impl Into<String>) -> ConnectionSettings {
        ConnectionSettings {
            hostname: host.into(),
            username: self.admin_user.clone(),
            password: self.admin_password.clone(),
            port: self.admin_port,
        }
    }

    pub fn identifier_policy(&self) -> IdentifierPolicy {
        match self.username_max_len {
            Some(max_len) if max_len > 0 => {
                IdentifierPolicy::truncating(max_len, self.username_suffix_len)
            }
            _ => IdentifierPolicy::unbounded(),
        }
    }

    /// Host reported back to a tenant after provisioning a schema.
    pub fn public_host(&self, service_host: Option<&str>) -> String {
        service_host
            .or(self.database_host.as_deref())
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_SERVICE_HOST)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("MYSQLAPI_ADMIN_USER", "admin");
            jail.set_env("MYSQLAPI_ADMIN_PORT", "3307");
            jail.set_env("MYSQLAPI_DATABASE_HOST", "10.0.1.100");
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.admin_user, "admin");
            assert_eq!(cfg.admin_port, 3307);
            assert_eq!(cfg.database_host.as_deref(), Some("10.0.1.100"));
            assert_eq!(cfg.mysqldump_path, "mysqldump");
            Ok(())
        });
    }

    #[test]
    fn public_host_prefers_explicit_service_host() {
        let cfg = Config {
            database_host: Some("10.0.1.100".into()),
            ..Config::default()
        };
        assert_eq!(cfg.public_host(Some("127.0.0.1")), "127.0.0.1");
        assert_eq!(cfg.public_host(None), "10.0.1.100");
        assert_eq!(Config::default().public_host(None), "localhost");
    }

    #[test]
    fn zero_max_len_disables_truncation() {
        let cfg = Config {
            username_max_len: Some(0),
            ..Config::default()
        };
        let name = "a".repeat(40);
        assert_eq!(cfg.identifier_policy().derive_username(&name), name);
    }
}

use futures::TryStreamExt;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Connection, ConnectionSettings, statements};
use crate::error::{ApiError, codes};
use crate::service::credentials::{IdentifierPolicy, generate_password};
use crate::service::dump::DumpExporter;
use crate::types::credentials::{DatabaseCredential, UserCredential};

/// Lifecycle operations for one schema on one administrative endpoint.
///
/// Built per request and dropped afterwards; every call opens its own session
/// and closes it before returning.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    name: String,
    settings: ConnectionSettings,
    policy: IdentifierPolicy,
    password_len: usize,
    dump_program: String,
}

impl DatabaseManager {
    pub fn new(name: impl Into<String>, host: impl Into<String>, cfg: &Config) -> Self {
        Self {
            name: name.into(),
            settings: cfg.connection_settings(host),
            policy: cfg.identifier_policy(),
            password_len: cfg.password_len,
            dump_program: cfg.mysqldump_path.clone(),
        }
    }

    pub fn with_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.settings.hostname
    }

    pub fn credential(&self, public_host: impl Into<String>) -> DatabaseCredential {
        DatabaseCredential {
            database_name: self.name.clone(),
            host: public_host.into(),
            port: self.settings.port,
        }
    }

    async fn connect(&self) -> Result<Connection, ApiError> {
        let mut conn = Connection::new(self.settings.clone());
        conn.open().await?;
        Ok(conn)
    }

    /// Run `statements` in order on one session, closing it whatever the outcome.
    /// Returns the index of the failing statement along with the error.
    async fn run(&self, statements: &[String]) -> Result<(), (usize, ApiError)> {
        let mut conn = self.connect().await.map_err(|e| (0, e))?;
        let mut result = Ok(());
        for (idx, stmt) in statements.iter().enumerate() {
            if let Err(e) = conn.execute(stmt).await {
                result = Err((idx, e));
                break;
            }
        }
        conn.close().await;
        result
    }

    pub async fn create_database(&self) -> Result<(), ApiError> {
        self.run(&[statements::create_database(&self.name)])
            .await
            .map_err(|(_, e)| match e.engine_code() {
                Some(codes::DB_CREATE_EXISTS) => ApiError::AlreadyExists {
                    name: self.name.clone(),
                    message: e.to_string(),
                },
                _ => e,
            })?;
        info!(database = %self.name, host = %self.host(), "database created");
        Ok(())
    }

    pub async fn drop_database(&self) -> Result<(), ApiError> {
        self.run(&[statements::drop_database(&self.name)])
            .await
            .map_err(|(_, e)| match e.engine_code() {
                Some(codes::DB_DROP_EXISTS) => ApiError::NotFound {
                    name: self.name.clone(),
                    message: e.to_string(),
                },
                _ => e,
            })?;
        info!(database = %self.name, host = %self.host(), "database dropped");
        Ok(())
    }

    /// Create an account limited to `hostname` with full privileges on this schema.
    ///
    /// The returned username can differ from `requested`; see [`IdentifierPolicy`].
    /// Steps that succeeded before a failure are not undone.
    pub async fn create_user(
        &self,
        requested: &str,
        hostname: &str,
    ) -> Result<UserCredential, ApiError> {
        let username = self.policy.derive_username(requested);
        let password = generate_password(self.password_len);
        let steps = [
            statements::create_user(&username, hostname, &password),
            statements::grant_all(&self.name, &username, hostname),
            statements::FLUSH_PRIVILEGES.to_string(),
        ];

        if let Err((failed_at, e)) = self.run(&steps).await {
            if failed_at > 0 {
                warn!(
                    database = %self.name,
                    username = %username,
                    hostname = %hostname,
                    completed_steps = failed_at,
                    error = %e,
                    "create user failed partway; account left for manual cleanup"
                );
            }
            return Err(e);
        }

        info!(
            database = %self.name,
            username = %username,
            hostname = %hostname,
            "user created"
        );
        Ok(UserCredential { username, password })
    }

    pub async fn drop_user(&self, username: &str, hostname: &str) -> Result<(), ApiError> {
        self.run(&[statements::drop_user(username, hostname)])
            .await
            .map_err(|(_, e)| match e.engine_code() {
                Some(codes::CANNOT_USER) => ApiError::DropUserFailed {
                    username: username.to_string(),
                    hostname: hostname.to_string(),
                    message: e.to_string(),
                },
                _ => e,
            })?;
        info!(username = %username, hostname = %hostname, "user dropped");
        Ok(())
    }

    /// Liveness probe; every connection failure becomes `false`.
    pub async fn is_up(&self) -> bool {
        match self.connect().await {
            Ok(mut conn) => {
                conn.close().await;
                true
            }
            Err(e) => {
                warn!(
                    host = %self.host(),
                    port = self.settings.port,
                    error = %e,
                    "database server is unreachable"
                );
                false
            }
        }
    }

    pub async fn export(&self) -> Result<Vec<u8>, ApiError> {
        DumpExporter::new(self.dump_program.clone(), self.settings.clone())
            .export_schema(&self.name)
            .await
    }

    pub async fn database_exists(&self) -> Result<bool, ApiError> {
        self.exists(&statements::schema_lookup(&self.name)).await
    }

    pub async fn account_exists(&self, username: &str, hostname: &str) -> Result<bool, ApiError> {
        self.exists(&statements::account_lookup(username, hostname))
            .await
    }

    async fn exists(&self, lookup: &str) -> Result<bool, ApiError> {
        let mut conn = self.connect().await?;
        let found = {
            let mut rows = conn.query(lookup)?;
            rows.try_next().await.map(|row| row.is_some())
        };
        conn.close().await;
        found
    }
}

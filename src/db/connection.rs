use futures::stream::{BoxStream, StreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection as _, Executor};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Parameters of one administrative session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub hostname: String,
    pub username: String,
    pub password: Option<String>,
    pub port: u16,
}

impl ConnectionSettings {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let opts = MySqlConnectOptions::new()
            .host(&self.hostname)
            .port(self.port)
            .username(&self.username)
            // CREATE USER carries a freshly minted password.
            .disable_statement_logging();
        match self.password.as_deref() {
            Some(password) => opts.password(password),
            None => opts,
        }
    }
}

/// A single administrative session, owned by whoever opened it.
///
/// `open` must be called before any statement; `close` can be called any
/// number of times, including after a failed `open`.
pub struct Connection {
    settings: ConnectionSettings,
    inner: Option<MySqlConnection>,
}

impl Connection {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            inner: None,
        }
    }

    pub async fn open(&mut self) -> Result<(), ApiError> {
        if self.inner.is_some() {
            return Ok(());
        }
        let conn = self
            .settings
            .connect_options()
            .connect()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        debug!(
            host = %self.settings.hostname,
            port = self.settings.port,
            "administrative session opened"
        );
        self.inner = Some(conn);
        Ok(())
    }

    /// Raw session access for operations that need to drive the protocol themselves.
    pub fn session(&mut self) -> Result<&mut MySqlConnection, ApiError> {
        self.inner
            .as_mut()
            .ok_or_else(|| ApiError::Connection("connection is not open".to_string()))
    }

    /// Run one statement that returns no rows.
    pub async fn execute(&mut self, statement: &str) -> Result<(), ApiError> {
        let session = self.session()?;
        Executor::execute(session, sqlx::raw_sql(statement))
            .await
            .map_err(ApiError::from_statement)?;
        Ok(())
    }

    /// Run a statement that returns rows.
    ///
    /// The stream borrows the session, so it has to be drained or dropped
    /// before the next statement is issued.
    pub fn query<'c>(
        &'c mut self,
        statement: &'c str,
    ) -> Result<BoxStream<'c, Result<MySqlRow, ApiError>>, ApiError> {
        let session = self.session()?;
        Ok(sqlx::raw_sql(statement)
            .fetch(session)
            .map(|row| row.map_err(ApiError::from_statement))
            .boxed())
    }

    pub async fn close(&mut self) {
        if let Some(conn) = self.inner.take()
            && let Err(e) = conn.close().await
        {
            warn!(host = %self.settings.hostname, error = %e, "closing administrative session failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ConnectionSettings {
        ConnectionSettings {
            hostname: "127.0.0.1".into(),
            username: "root".into(),
            password: None,
            port: 1,
        }
    }

    #[tokio::test]
    async fn statements_require_an_open_session() {
        let mut conn = Connection::new(settings());
        let err = conn.execute("FLUSH PRIVILEGES").await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
        assert!(conn.query("SELECT 1").is_err());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn statement_futures_are_send() {
        let mut conn = Connection::new(settings());
        let fut = conn.execute("FLUSH PRIVILEGES");
        assert_send(&fut);
    }

    #[tokio::test]
    async fn refused_endpoint_is_a_connection_error_and_close_stays_safe() {
        let mut conn = Connection::new(settings());
        let err = conn.open().await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
        conn.close().await;
        conn.close().await;
        assert!(conn.session().is_err());
    }
}

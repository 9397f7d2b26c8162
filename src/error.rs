use axum::{
    http::{StatusCode, header},
    response::IntoResponse,
};
use thiserror::Error as ThisError;

/// MySQL error numbers the lifecycle manager gives a domain meaning to.
pub mod codes {
    /// `ER_DB_CREATE_EXISTS`
    pub const DB_CREATE_EXISTS: u16 = 1007;
    /// `ER_DB_DROP_EXISTS`
    pub const DB_DROP_EXISTS: u16 = 1008;
    /// `ER_BAD_DB_ERROR`
    pub const BAD_DB: u16 = 1049;
    /// `ER_CANNOT_USER`
    pub const CANNOT_USER: u16 = 1396;
}

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("App name is missing")]
    MissingName,

    #[error("App name is empty")]
    EmptyName,

    #[error("Hostname is missing")]
    MissingHostname,

    #[error("Hostname is empty")]
    EmptyHostname,

    #[error("{message}")]
    AlreadyExists { name: String, message: String },

    #[error("{message}")]
    NotFound { name: String, message: String },

    #[error("{message}")]
    DropUserFailed {
        username: String,
        hostname: String,
        message: String,
    },

    /// Any other statement the engine rejected; `message` is the engine's text.
    #[error("{message}")]
    Statement { code: Option<u16>, message: String },

    #[error("{0}")]
    Connection(String),

    #[error("{message}")]
    UnknownDatabase { name: String, message: String },

    #[error("{diagnostics}")]
    ExportFailed {
        status: Option<i32>,
        diagnostics: String,
    },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl ApiError {
    /// Wrap a sqlx failure raised while a statement was running.
    pub fn from_statement(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(|e| e.number());
                ApiError::Statement {
                    code,
                    message: db_err.message().to_string(),
                }
            }
            other => ApiError::Statement {
                code: None,
                message: other.to_string(),
            },
        }
    }

    /// Engine error number of a statement failure, if one was reported.
    pub fn engine_code(&self) -> Option<u16> {
        match self {
            ApiError::Statement { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<figment::Error> for ApiError {
    fn from(e: figment::Error) -> Self {
        ApiError::Config(Box::new(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

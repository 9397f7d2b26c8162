use serde::Serialize;

/// Where a provisioned schema can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCredential {
    pub database_name: String,
    pub host: String,
    pub port: u16,
}

/// Account minted for a tenant; the password is never stored server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub username: String,
    pub password: String,
}

/// Response body of create-database, shaped as tenant environment variables.
#[derive(Debug, Serialize)]
pub struct DatabaseEnv {
    #[serde(rename = "MYSQL_DATABASE_NAME")]
    pub database_name: String,
    #[serde(rename = "MYSQL_HOST")]
    pub host: String,
    #[serde(rename = "MYSQL_PORT")]
    pub port: String,
}

/// Response body of create-user.
#[derive(Debug, Serialize)]
pub struct UserEnv {
    #[serde(rename = "MYSQL_USER")]
    pub user: String,
    #[serde(rename = "MYSQL_PASSWORD")]
    pub password: String,
}

impl From<DatabaseCredential> for DatabaseEnv {
    fn from(c: DatabaseCredential) -> Self {
        Self {
            database_name: c.database_name,
            host: c.host,
            port: c.port.to_string(),
        }
    }
}

impl From<UserCredential> for UserEnv {
    fn from(c: UserCredential) -> Self {
        Self {
            user: c.username,
            password: c.password,
        }
    }
}

//! Administrative SQL the lifecycle manager is allowed to issue.
//!
//! Statements are sent over the text protocol, so names and secrets are quoted
//! here rather than bound as parameters.

pub const FLUSH_PRIVILEGES: &str = "FLUSH PRIVILEGES";

/// Backtick-quote a schema identifier.
pub fn quote_identifier(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Single-quote a string literal (account names, host patterns, passwords).
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn account(username: &str, hostname: &str) -> String {
    format!("{}@{}", quote_literal(username), quote_literal(hostname))
}

pub fn create_database(name: &str) -> String {
    format!("CREATE DATABASE {}", quote_identifier(name))
}

pub fn drop_database(name: &str) -> String {
    format!("DROP DATABASE {}", quote_identifier(name))
}

pub fn create_user(username: &str, hostname: &str, password: &str) -> String {
    format!(
        "CREATE USER {} IDENTIFIED BY {}",
        account(username, hostname),
        quote_literal(password)
    )
}

pub fn grant_all(database: &str, username: &str, hostname: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON {}.* TO {}",
        quote_identifier(database),
        account(username, hostname)
    )
}

pub fn drop_user(username: &str, hostname: &str) -> String {
    format!("DROP USER {}", account(username, hostname))
}

pub fn schema_lookup(name: &str) -> String {
    format!(
        "SELECT SCHEMA_NAME FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = {}",
        quote_literal(name)
    )
}

pub fn account_lookup(username: &str, hostname: &str) -> String {
    format!(
        "SELECT User, Host FROM mysql.user WHERE User = {} AND Host = {}",
        quote_literal(username),
        quote_literal(hostname)
    )
}

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::db::ConnectionSettings;
use crate::error::{ApiError, codes};

/// What a dump covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpTarget {
    Schema(String),
    AllSchemas,
}

/// Runs the logical-dump tool against one administrative endpoint.
#[derive(Debug, Clone)]
pub struct DumpExporter {
    program: String,
    settings: ConnectionSettings,
}

impl DumpExporter {
    pub fn new(program: impl Into<String>, settings: ConnectionSettings) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Argument vector passed to the dump tool, program name excluded.
    pub fn args(&self, target: &DumpTarget) -> Vec<String> {
        let mut args = vec![
            "-h".to_string(),
            self.settings.hostname.clone(),
            "-P".to_string(),
            self.settings.port.to_string(),
            "-u".to_string(),
            self.settings.username.clone(),
            "--quick".to_string(),
        ];
        match target {
            DumpTarget::Schema(name) => {
                args.push("--compact".to_string());
                // Names come from request paths; never let one parse as an option.
                args.push("--".to_string());
                args.push(name.clone());
            }
            DumpTarget::AllSchemas => {
                args.push("--all-databases".to_string());
                args.push("--compact".to_string());
            }
        }
        args
    }

    pub async fn export_schema(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.run(&DumpTarget::Schema(name.to_string())).await
    }

    pub async fn export_all(&self) -> Result<Vec<u8>, ApiError> {
        self.run(&DumpTarget::AllSchemas).await
    }

    async fn run(&self, target: &DumpTarget) -> Result<Vec<u8>, ApiError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Keeps the password off the process list.
        if let Some(password) = self.settings.password.as_deref() {
            cmd.env("MYSQL_PWD", password);
        }

        debug!(program = %self.program, target = ?target, host = %self.settings.hostname, "starting dump");
        let output = cmd.output().await.map_err(|e| ApiError::ExportFailed {
            status: None,
            diagnostics: format!("failed to execute '{}': {e}", self.program),
        })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if diagnostics.is_empty() {
            diagnostics = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        warn!(
            program = %self.program,
            status = ?output.status.code(),
            diagnostics = %diagnostics,
            "dump failed"
        );
        Err(classify_failure(target, output.status.code(), diagnostics))
    }
}

/// Split `mysqldump: Got error: 1049: Unknown database 'x' ...` into code and message.
fn parse_tool_error(diagnostics: &str) -> Option<(u16, &str)> {
    diagnostics.lines().find_map(|line| {
        let (_, rest) = line.split_once("Got error: ")?;
        let (code, message) = rest.split_once(": ")?;
        Some((code.trim().parse().ok()?, message.trim()))
    })
}

fn classify_failure(target: &DumpTarget, status: Option<i32>, diagnostics: String) -> ApiError {
    match (target, parse_tool_error(&diagnostics)) {
        (DumpTarget::Schema(name), Some((codes::BAD_DB, message))) => ApiError::UnknownDatabase {
            name: name.clone(),
            message: message.to_string(),
        },
        _ => ApiError::ExportFailed {
            status,
            diagnostics,
        },
    }
}

//! SSH command channel.
//!
//! Some EOS show commands have no eAPI JSON model. For those, the plugin
//! falls back to the device CLI over SSH, using the system `ssh` client in
//! batch mode. Authentication is key-based; password prompts are disabled
//! so a missing key fails fast instead of hanging the run.
//!
//! # Example
//!
//! ```ignore
//! use eos_eapi::shell::SshShell;
//! use eos_eapi::Command;
//!
//! let shell = SshShell::new("leaf1", "admin", Duration::from_secs(30));
//! let out = shell.run(&[Command::json("show lldp neighbors")]).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as Process;

use crate::command::{Channel, Command, OutputFormat, RawResponse};
use crate::error::{TransportError, TransportResult};

/// Default path to the OpenSSH client.
pub const SSH_CMD: &str = "ssh";

/// EOS CLI error lines start with `%` (e.g. `% Invalid input`).
static CLI_ERROR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^%\s*(.+)$").expect("Invalid regex pattern"));

/// Result of one local process execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the process (0 = success).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Runs `program` with `args`, capturing output.
pub async fn exec(program: &str, args: &[String]) -> TransportResult<ExecResult> {
    tracing::debug!(program = %program, args = ?args, "Executing local command");

    let output = Process::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| TransportError::ShellExec {
            command: program.to_string(),
            message: e.to_string(),
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let result = ExecResult {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(program = %program, "Command succeeded");
    } else {
        tracing::warn!(
            program = %program,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// SSH channel to one device.
#[derive(Debug, Clone)]
pub struct SshShell {
    host: String,
    username: String,
    timeout: Duration,
    port: Option<u16>,
}

impl SshShell {
    pub fn new(host: impl Into<String>, username: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            timeout,
            port: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The remote command line for `command`; JSON output is piped through `| json`.
    pub fn remote_command(command: &Command) -> String {
        match command.format {
            OutputFormat::Json => format!("{} | json", command.cmd),
            OutputFormat::Text => command.cmd.clone(),
        }
    }

    /// Arguments passed to the local `ssh` client.
    pub fn ssh_args(&self, command: &Command) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.timeout.as_secs().max(1)),
            "-l".to_string(),
            self.username.clone(),
        ];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.host.clone());
        args.push(Self::remote_command(command));
        args
    }

    /// Runs each command in order, one SSH invocation per command.
    pub async fn run(&self, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        let mut responses = Vec::with_capacity(commands.len());
        for command in commands {
            responses.push(self.run_one(command).await?);
        }
        Ok(responses)
    }

    async fn run_one(&self, command: &Command) -> TransportResult<RawResponse> {
        let args = self.ssh_args(command);
        let result = tokio::time::timeout(self.timeout, exec(SSH_CMD, &args))
            .await
            .map_err(|_| TransportError::timeout(&self.host, self.timeout))??;

        // ssh exits 255 for its own failures (unreachable, auth)
        if result.exit_code == 255 {
            return Err(classify_ssh_failure(&self.host, &result));
        }
        if !result.success() {
            return Err(TransportError::ShellCommandFailed {
                command: command.cmd.clone(),
                exit_code: result.exit_code,
                output: result.combined_output(),
            });
        }

        parse_output(command, result.stdout)
    }
}

fn classify_ssh_failure(host: &str, result: &ExecResult) -> TransportError {
    let stderr = result.stderr.to_ascii_lowercase();
    if stderr.contains("permission denied") {
        TransportError::auth(host)
    } else {
        TransportError::connection(host, result.stderr.clone())
    }
}

fn parse_output(command: &Command, stdout: String) -> TransportResult<RawResponse> {
    if let Some(caps) = CLI_ERROR_RE.captures(&stdout) {
        let message = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return Err(TransportError::Command {
            command: command.cmd.clone(),
            code: -1,
            message: message.to_string(),
        });
    }

    match command.format {
        OutputFormat::Text => Ok(RawResponse::Text(stdout)),
        OutputFormat::Json => serde_json::from_str(&stdout)
            .map(RawResponse::Json)
            .map_err(|_| TransportError::unsupported(&command.cmd, Channel::Shell)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_remote_command_json_pipe() {
        assert_eq!(
            SshShell::remote_command(&Command::json("show lldp neighbors")),
            "show lldp neighbors | json"
        );
        assert_eq!(
            SshShell::remote_command(&Command::text("show run")),
            "show run"
        );
    }

    #[test]
    fn test_ssh_args() {
        let shell = SshShell::new("leaf1", "admin", Duration::from_secs(30)).with_port(2222);
        let args = shell.ssh_args(&Command::json("show version"));
        assert_eq!(
            args,
            vec![
                "-o",
                "BatchMode=yes",
                "-o",
                "ConnectTimeout=30",
                "-l",
                "admin",
                "-p",
                "2222",
                "leaf1",
                "show version | json"
            ]
        );
    }

    #[test]
    fn test_parse_json_output() {
        let out = parse_output(&Command::json("show version"), r#"{"modelName": "DCS-7280"}"#.to_string())
            .unwrap();
        assert_eq!(out, RawResponse::Json(json!({"modelName": "DCS-7280"})));
    }

    #[test]
    fn test_parse_cli_error() {
        let err = parse_output(
            &Command::json("show bogus"),
            "% Invalid input (at token 1: 'bogus')".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, TransportError::Command { .. }));
    }

    #[test]
    fn test_parse_non_json_is_unsupported() {
        let err = parse_output(&Command::json("show tech"), "plain text".to_string()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_classify_ssh_failure() {
        let denied = ExecResult {
            exit_code: 255,
            stdout: String::new(),
            stderr: "admin@leaf1: Permission denied (publickey).".to_string(),
        };
        assert_eq!(classify_ssh_failure("leaf1", &denied), TransportError::auth("leaf1"));

        let unreachable = ExecResult {
            exit_code: 255,
            stdout: String::new(),
            stderr: "ssh: connect to host leaf1 port 22: No route to host".to_string(),
        };
        assert!(classify_ssh_failure("leaf1", &unreachable).is_retryable());
    }

    #[test]
    fn test_exec_result_combined() {
        let result = ExecResult {
            exit_code: 1,
            stdout: "stdout".to_string(),
            stderr: "stderr".to_string(),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "stdout\nstderr");
    }

    #[tokio::test]
    async fn test_exec_missing_program() {
        let err = exec("/nonexistent/netcam-ssh", &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::ShellExec { .. }));
    }
}

//! eAPI JSON-RPC client.
//!
//! EOS exposes its CLI as a JSON-RPC 2.0 endpoint at `/command-api`. One
//! `runCmds` request carries an ordered batch of commands and a single
//! output format; the reply holds one result per command, in order.

use crate::command::{Channel, Command, OutputFormat, RawResponse};
use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument};

/// eAPI error code for output that cannot be rendered as JSON.
pub const EAPI_UNCONVERTED_COMMAND: i64 = 1003;

#[derive(Debug, Serialize)]
struct RunCmdsRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RunCmdsParams<'a>,
    id: String,
}

#[derive(Debug, Serialize)]
struct RunCmdsParams<'a> {
    version: u32,
    cmds: Vec<&'a str>,
    format: OutputFormat,
}

#[derive(Debug, Deserialize)]
struct RunCmdsReply {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for one device's eAPI endpoint.
pub struct EapiClient {
    host: String,
    url: String,
    http: reqwest::Client,
    username: String,
    password: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EapiClient")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EapiClient {
    /// Creates a client for `https://<host>[:port]/command-api`.
    pub fn new(
        host: impl Into<String>,
        port: Option<u16>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
        verify_tls: bool,
    ) -> TransportResult<Self> {
        let host = host.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| TransportError::connection(&host, e.to_string()))?;

        let url = match port {
            Some(port) => format!("https://{}:{}/command-api", host, port),
            None => format!("https://{}/command-api", host),
        };

        Ok(Self {
            host,
            url,
            http,
            username: username.into(),
            password: password.into(),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Runs an ordered batch of commands.
    ///
    /// A batch mixing JSON and text commands is sent as consecutive
    /// same-format requests; responses keep the order of `commands`.
    #[instrument(skip(self, commands), fields(host = %self.host, count = commands.len()))]
    pub async fn run_cmds(&self, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        let mut responses = Vec::with_capacity(commands.len());
        for group in format_groups(commands) {
            responses.extend(self.run_group(group).await?);
        }
        Ok(responses)
    }

    async fn run_group(&self, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        let Some(format) = commands.first().map(|c| c.format) else {
            return Ok(Vec::new());
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = build_request(commands, format, id);

        debug!(host = %self.host, format = format.as_str(), "Sending runCmds");

        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TransportError::auth(&self.host));
        }
        if !status.is_success() {
            return Err(TransportError::protocol(
                &self.host,
                format!("HTTP status {}", status),
            ));
        }

        let reply: Value = response.json().await.map_err(|e| self.map_http_error(e))?;
        parse_reply(&self.host, commands, reply)
    }

    fn map_http_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::timeout(&self.host, self.timeout)
        } else if err.is_connect() {
            TransportError::connection(&self.host, err.to_string())
        } else {
            TransportError::protocol(&self.host, err.to_string())
        }
    }
}

/// Splits `commands` into maximal runs sharing one output format.
fn format_groups(commands: &[Command]) -> Vec<&[Command]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for idx in 1..=commands.len() {
        if idx == commands.len() || commands[idx].format != commands[start].format {
            groups.push(&commands[start..idx]);
            start = idx;
        }
    }
    groups
}

fn build_request(commands: &[Command], format: OutputFormat, id: u64) -> RunCmdsRequest<'_> {
    RunCmdsRequest {
        jsonrpc: "2.0",
        method: "runCmds",
        params: RunCmdsParams {
            version: 1,
            cmds: commands.iter().map(|c| c.cmd.as_str()).collect(),
            format,
        },
        id: format!("netcam-eos-{}", id),
    }
}

fn parse_reply(host: &str, commands: &[Command], reply: Value) -> TransportResult<Vec<RawResponse>> {
    let reply: RunCmdsReply = serde_json::from_value(reply)
        .map_err(|e| TransportError::protocol(host, format!("invalid JSON-RPC reply: {}", e)))?;

    if let Some(err) = reply.error {
        // data holds one entry per command that ran; the last one failed
        let failed = err
            .data
            .len()
            .checked_sub(1)
            .and_then(|idx| commands.get(idx))
            .or_else(|| commands.first())
            .map(|c| c.cmd.clone())
            .unwrap_or_default();
        if err.code == EAPI_UNCONVERTED_COMMAND {
            return Err(TransportError::unsupported(failed, Channel::Rpc));
        }
        return Err(TransportError::Command {
            command: failed,
            code: err.code,
            message: err.message,
        });
    }

    let results = reply
        .result
        .ok_or_else(|| TransportError::protocol(host, "reply has neither result nor error"))?;
    if results.len() != commands.len() {
        return Err(TransportError::protocol(
            host,
            format!(
                "expected {} results, received {}",
                commands.len(),
                results.len()
            ),
        ));
    }

    results
        .into_iter()
        .zip(commands)
        .map(|(result, cmd)| match cmd.format {
            OutputFormat::Json => Ok(RawResponse::Json(result)),
            OutputFormat::Text => result
                .get("output")
                .and_then(Value::as_str)
                .map(|text| RawResponse::Text(text.to_string()))
                .ok_or_else(|| {
                    TransportError::protocol(host, format!("no text output for '{}'", cmd.cmd))
                }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_build_request_shape() {
        let cmds = vec![Command::json("show version"), Command::json("show lldp neighbors")];
        let body = serde_json::to_value(build_request(&cmds, OutputFormat::Json, 7)).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "runCmds",
                "params": {
                    "version": 1,
                    "cmds": ["show version", "show lldp neighbors"],
                    "format": "json"
                },
                "id": "netcam-eos-7"
            })
        );
    }

    #[test]
    fn test_format_groups_preserve_order() {
        let cmds = vec![
            Command::json("a"),
            Command::json("b"),
            Command::text("c"),
            Command::json("d"),
        ];
        let groups: Vec<Vec<&str>> = format_groups(&cmds)
            .into_iter()
            .map(|g| g.iter().map(|c| c.cmd.as_str()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
        assert!(format_groups(&[]).is_empty());
    }

    #[test]
    fn test_parse_json_results() {
        let cmds = vec![Command::json("show version")];
        let reply = json!({"jsonrpc": "2.0", "id": "1", "result": [{"modelName": "DCS-7050SX3"}]});
        let responses = parse_reply("leaf1", &cmds, reply).unwrap();
        assert_eq!(
            responses,
            vec![RawResponse::Json(json!({"modelName": "DCS-7050SX3"}))]
        );
    }

    #[test]
    fn test_parse_text_results() {
        let cmds = vec![Command::text("show running-config")];
        let reply = json!({"result": [{"output": "hostname leaf1\n"}]});
        let responses = parse_reply("leaf1", &cmds, reply).unwrap();
        assert_eq!(responses[0].as_text(), Some("hostname leaf1\n"));
    }

    #[test]
    fn test_parse_unconverted_is_unsupported() {
        let cmds = vec![Command::json("show version"), Command::json("show tech")];
        let reply = json!({
            "error": {
                "code": 1003,
                "message": "CLI command 2 of 2 'show tech' failed: not converted",
                "data": [{}, {"errors": ["not converted"]}]
            }
        });
        let err = parse_reply("leaf1", &cmds, reply).unwrap_err();
        assert_eq!(err, TransportError::unsupported("show tech", Channel::Rpc));
    }

    #[test]
    fn test_parse_command_error() {
        let cmds = vec![Command::json("show bogus")];
        let reply = json!({
            "error": {"code": 1002, "message": "invalid command", "data": [{"errors": ["Invalid input"]}]}
        });
        let err = parse_reply("leaf1", &cmds, reply).unwrap_err();
        assert!(matches!(err, TransportError::Command { code: 1002, .. }));
    }

    #[test]
    fn test_parse_count_mismatch() {
        let cmds = vec![Command::json("a"), Command::json("b")];
        let err = parse_reply("leaf1", &cmds, json!({"result": [{}]})).unwrap_err();
        assert!(matches!(err, TransportError::Protocol { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let client = EapiClient::new("leaf1", None, "admin", "hunter2", Duration::from_secs(5), false)
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("https://leaf1/command-api"));
        assert!(!debug.contains("hunter2"));
    }
}

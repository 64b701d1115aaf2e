//! netcam-eos entry point.
//!
//! Validates one or more EOS devices against a design file and prints a
//! report per device. Exits non-zero if any device fails or cannot be run.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use eos_eapi::EapiConnector;
use futures::future::join_all;
use netcam_aioeos::{DesignFile, EosPlugin, PluginConfig, RunError};
use netcam_check_common::{CheckStatus, DesignService, DeviceReport, TopicId, TopicOutcome};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Validate Arista EOS devices against a design.
#[derive(Debug, Parser)]
#[command(name = "netcam-eos", version)]
struct Args {
    /// Plugin configuration (TOML)
    #[arg(long, default_value = "netcam.toml")]
    config: PathBuf,

    /// Design expectation file (JSON)
    #[arg(long)]
    design: PathBuf,

    /// Device to validate; every design device when omitted
    #[arg(long = "device")]
    devices: Vec<String>,

    /// Design service whose topics to check
    #[arg(long = "service")]
    services: Vec<DesignService>,

    /// Topic to check
    #[arg(long = "topic")]
    topics: Vec<TopicId>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Devices validated at the same time
    #[arg(long, default_value_t = 4)]
    max_concurrent: usize,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Topics named directly or through a service, in first-seen order.
    /// Empty means every topic.
    fn selected_topics(&self) -> Vec<TopicId> {
        let mut topics = Vec::new();
        let named = self
            .services
            .iter()
            .flat_map(|s| s.topics().iter().copied())
            .chain(self.topics.iter().copied());
        for topic in named {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}

fn print_text(report: &DeviceReport) {
    println!("{}: {}", report.device, report.status);
    let summaries = report.to_summary();
    for topic in &report.topics {
        match (&topic.outcome, summaries.get(&topic.topic)) {
            (TopicOutcome::Unavailable { reason }, _) => {
                println!("  {:<13} UNAVAILABLE ({})", topic.topic.as_str(), reason);
            }
            (TopicOutcome::Checked { .. }, Some(summary)) => println!(
                "  {:<13} {} pass={} fail={} info={} skip={}",
                topic.topic.as_str(),
                topic.status(),
                summary.pass_count,
                summary.fail_count,
                summary.info_count,
                summary.skip_count
            ),
            (TopicOutcome::Checked { .. }, None) => {}
        }
    }
    for result in report.results().filter(|r| r.status != CheckStatus::Pass) {
        match &result.reason {
            Some(reason) => println!("  {} {} {}: {}", result.status, result.topic, result.key, reason),
            None => println!("  {} {} {}", result.status, result.topic, result.key),
        }
        for mismatch in &result.mismatches {
            println!("      {}", mismatch);
        }
        for note in &result.notes {
            println!("      note: {}", note);
        }
    }
}

/// One entry of the JSON output: a report, or the error that prevented one.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DeviceOutput<'a> {
    Report(&'a DeviceReport),
    Error { device: &'a str, error: String },
}

/// Renders every device outcome, in device order.
fn render_json(outcomes: &[std::result::Result<DeviceReport, RunError>]) -> serde_json::Result<String> {
    let entries: Vec<DeviceOutput<'_>> = outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(report) => DeviceOutput::Report(report),
            Err(e) => DeviceOutput::Error {
                device: &e.device_id,
                error: e.cause.to_string(),
            },
        })
        .collect();
    serde_json::to_string_pretty(&entries)
}

async fn run(args: Args) -> Result<bool> {
    let config = PluginConfig::load_or_default(&args.config).context("failed to load plugin configuration")?;
    let credentials = config.credentials()?;
    let design = DesignFile::load(&args.design).context("failed to load design")?;

    let devices: Vec<String> = if args.devices.is_empty() {
        design.device_ids().map(str::to_string).collect()
    } else {
        args.devices.clone()
    };
    let topics = args.selected_topics();
    info!(devices = devices.len(), topics = topics.len(), "Validating");

    let connector = Arc::new(EapiConnector::new(config.retry_policy()));
    let plugin = EosPlugin::new(config, credentials, connector, Arc::new(design));
    let permits = Semaphore::new(args.max_concurrent.max(1));

    let outcomes: Vec<std::result::Result<DeviceReport, RunError>> =
        join_all(devices.iter().map(|device| {
            let (plugin, permits, topics) = (&plugin, &permits, &topics);
            async move {
                let _permit = permits.acquire().await;
                plugin.run(device, topics).await
            }
        }))
        .await;

    let mut ok = true;
    for outcome in &outcomes {
        match outcome {
            Ok(report) => ok &= !report.is_fail(),
            Err(e) => {
                ok = false;
                error!(device = %e.device_id, error = %e, "Device run failed");
                if args.format == Format::Text {
                    println!("{}: ERROR {}", e.device_id, e.cause);
                }
            }
        }
    }

    match args.format {
        Format::Text => outcomes.iter().flatten().for_each(print_text),
        Format::Json => println!("{}", render_json(&outcomes)?),
    }
    Ok(ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("netcam-eos error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_selection() {
        let args = Args::try_parse_from([
            "netcam-eos",
            "--design",
            "design.json",
            "--service",
            "vlans",
            "--topic",
            "lags",
            "--topic",
            "switchports",
        ])
        .unwrap();
        assert_eq!(
            args.selected_topics(),
            vec![TopicId::Vlans, TopicId::Switchports, TopicId::Lags]
        );
        assert_eq!(args.format, Format::Text);
        assert_eq!(args.config, PathBuf::from("netcam.toml"));
    }

    #[test]
    fn test_no_selection_means_all() {
        let args = Args::try_parse_from(["netcam-eos", "--design", "d.json", "--format", "json"]).unwrap();
        assert!(args.selected_topics().is_empty());
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn test_json_lists_failed_devices() {
        let report = netcam_check_common::aggregate(
            "leaf1",
            [(TopicId::Lags, TopicOutcome::unavailable("no data"))],
        );
        let outcomes = vec![
            Ok(report),
            Err(RunError {
                device_id: "leaf2".to_string(),
                cause: netcam_aioeos::RunCause::TimedOut,
            }),
        ];

        let rendered: serde_json::Value = serde_json::from_str(&render_json(&outcomes).unwrap()).unwrap();
        let entries = rendered.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["device"], "leaf1");
        assert_eq!(entries[0]["status"], "SKIP");
        assert_eq!(entries[1], serde_json::json!({"device": "leaf2", "error": "run timed out"}));
    }

    #[test]
    fn test_unknown_topic_rejected() {
        assert!(Args::try_parse_from(["netcam-eos", "--design", "d.json", "--topic", "mlags"]).is_err());
    }
}

//! One pruning run: connect, list every selected kind, filter, delete, report

use crate::notify;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use stackprune_cloud::{DEFAULT_CAPACITY, FanIn, Mode, Pipeline, RunReport};
use stackprune_config::{RunConfig, format_duration};
use stackprune_openstack::{EndpointOptions, Services, Session, default_rules};
use std::io::{IsTerminal, Write};
use tokio_util::sync::CancellationToken;

/// How to reach the cloud
#[derive(Debug, Clone)]
pub struct CloudAccess {
    pub auth_url: String,
    pub token: String,
    pub endpoints: EndpointOptions,
}

/// Default per-kind rules for the selected kinds, then the run-wide filter
pub fn build_pipeline(
    config: &RunConfig,
    run_timestamp: DateTime<Utc>,
    cancel: CancellationToken,
) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(config.filter(run_timestamp), config.mode, cancel);
    for (kind, rule) in default_rules().context("Invalid default rules")? {
        if config.kinds.includes(kind) {
            pipeline = pipeline.with_kind_filter(kind, rule);
        }
    }
    Ok(pipeline)
}

fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing the current deletion and writing the report");
            cancel.cancel();
        }
    });
}

pub async fn run(config: RunConfig, access: CloudAccess) -> Result<()> {
    let run_timestamp = Utc::now();
    let verb = match config.mode {
        Mode::DryRun => "Listing",
        Mode::Live => "Deleting",
    };
    tracing::info!(
        "{} everything older than {} (created before {})",
        verb,
        format_duration(config.ttl),
        config.threshold(run_timestamp).to_rfc3339()
    );

    let cancel = CancellationToken::new();
    watch_ctrl_c(cancel.clone());

    let session = Session::connect(&access.auth_url, &access.token, access.endpoints)
        .await
        .context("Failed to authenticate")?;
    let services = Services::discover(&session).context("Failed to read the service catalog")?;
    let listers = services.listers(config.kinds.kinds())?;
    let pipeline = build_pipeline(&config, run_timestamp, cancel.clone())?;

    let mut fan_in = FanIn::new(DEFAULT_CAPACITY, cancel);
    for lister in listers {
        fan_in.spawn(lister);
    }
    let report = pipeline.run(fan_in.merge(), run_timestamp).await;

    emit_report(&report)?;
    print_summary(&report, config.mode);

    if let Some(slack) = &config.slack {
        if report.has_failures() {
            tracing::info!("Sending failed_to_delete report to Slack");
            notify::notify_failures(slack, &report)
                .await
                .context("Failed to send a report to Slack")?;
        }
    }
    Ok(())
}

/// Write the report to stdout, indented when a person is watching
fn emit_report(report: &RunReport) -> Result<()> {
    let stdout = std::io::stdout();
    let json = report.to_json(stdout.is_terminal())?;
    let mut out = stdout.lock();
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}

fn print_summary(report: &RunReport, mode: Mode) {
    let found = format!("{} found", report.found.len());
    let deleted = format!("{} deleted", report.deleted.len());
    let failed = format!("{} failed", report.failed_to_delete.len());
    let failed = if report.has_failures() {
        failed.red().bold()
    } else {
        failed.normal()
    };

    let mut line = match mode {
        Mode::DryRun => format!("{} {}", "Dry run:".cyan().bold(), found.yellow()),
        Mode::Live => format!("{} {}, {}, {}", "✓".green(), found.yellow(), deleted.green(), failed),
    };
    if !report.incomplete.is_empty() {
        let kinds: Vec<&str> = report.incomplete.iter().map(|k| k.kind.as_str()).collect();
        line.push_str(&format!(" ({} {})", "incomplete:".yellow(), kinds.join(", ")));
    }
    eprintln!("{line}");
}

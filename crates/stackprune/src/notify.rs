//! Slack notification of resources that could not be deleted

use anyhow::{Result, bail};
use reqwest::StatusCode;
use serde::Serialize;
use stackprune_cloud::RunReport;
use stackprune_config::SlackConfig;
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SlackPayload {
    text: String,
}

/// `Cluster <label>` (if any), then one `stale <type>: "<id>"` line per failure
pub fn build_message(report: &RunReport, cluster_label: Option<&str>) -> String {
    let mut message = String::new();
    if let Some(label) = cluster_label {
        let _ = writeln!(message, "Cluster {label}");
    }
    for resource in &report.failed_to_delete {
        let _ = writeln!(message, "stale {}: {:?}", resource.kind, resource.id);
    }
    message
}

fn accepted(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT)
}

/// Post the failures of `report` to the configured hook
pub async fn notify_failures(slack: &SlackConfig, report: &RunReport) -> Result<()> {
    let payload = SlackPayload {
        text: build_message(report, slack.cluster_label.as_deref()),
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = client.post(&slack.hook).json(&payload).send().await?;

    let status = response.status();
    if !accepted(status) {
        bail!("unexpected status code {} while sending a Slack notification", status);
    }
    Ok(())
}

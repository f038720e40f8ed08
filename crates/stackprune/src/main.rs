mod notify;
mod run;

use clap::Parser;
use stackprune_cloud::Kind;
use stackprune_config::{DEFAULT_KEEP_TAG, DEFAULT_RESOURCE_TTL, RunConfig, RunOptions};
use stackprune_openstack::EndpointOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stackprune", version)]
#[command(about = "Prune stale resources from an OpenStack cloud", long_about = None)]
#[command(after_help = format!("Available resource types: {}", Kind::selectors()))]
struct Cli {
    /// Minimum age of resources to prune, as a Go duration (e.g. "1h", "30m12s")
    #[arg(long, env = "STACKPRUNE_RESOURCE_TTL", default_value = DEFAULT_RESOURCE_TTL)]
    resource_ttl: String,

    /// Delete resources (default is a dry run that only lists them)
    #[arg(long)]
    no_dry_run: bool,

    /// Comma-separated list of resource types to include
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,

    /// Comma-separated list of resource types to exclude
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Slack hook; resources that could not be deleted are posted there
    #[arg(long, env = "SLACK_HOOK", hide_env_values = true)]
    slack_hook: Option<String>,

    /// Label shown as "Cluster <label>" in the Slack message
    #[arg(long, env = "CLUSTER_TYPE")]
    cluster_label: Option<String>,

    /// Tag that protects a resource from deletion
    #[arg(long, default_value = DEFAULT_KEEP_TAG)]
    keep_tag: String,

    /// YAML or JSON list of {type, id, name} entries never to delete
    /// [default: ~/.config/stackprune/ignore.yaml if present]
    #[arg(long, env = "STACKPRUNE_IGNORE_FILE")]
    ignore_file: Option<PathBuf>,

    /// Never delete the resource with this ID (repeatable)
    #[arg(long = "exclude-id", value_name = "ID")]
    exclude_ids: Vec<String>,

    /// Never delete resources with this exact name (repeatable)
    #[arg(long = "exclude-name", value_name = "NAME")]
    exclude_names: Vec<String>,

    /// Identity endpoint
    #[arg(long, env = "OS_AUTH_URL")]
    os_auth_url: String,

    /// Pre-issued token
    #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    os_token: String,

    /// Region to pick endpoints from
    #[arg(long, env = "OS_REGION_NAME")]
    os_region: Option<String>,

    /// Endpoint interface (public, internal, admin)
    #[arg(long, env = "OS_INTERFACE", default_value = "public")]
    os_interface: String,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            resource_ttl: self.resource_ttl.clone(),
            no_dry_run: self.no_dry_run,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            keep_tag: self.keep_tag.clone(),
            ignore_file: self.ignore_file.clone(),
            exclude_ids: self.exclude_ids.clone(),
            exclude_names: self.exclude_names.clone(),
            slack_hook: self.slack_hook.clone(),
            cluster_label: self.cluster_label.clone(),
        }
    }

    fn cloud_access(self) -> run::CloudAccess {
        run::CloudAccess {
            auth_url: self.os_auth_url,
            token: self.os_token,
            endpoints: EndpointOptions {
                interface: self.os_interface,
                region: self.os_region.filter(|r| !r.is_empty()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON report, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RunConfig::from_options(cli.run_options())?;
    run::run(config, cli.cloud_access()).await
}

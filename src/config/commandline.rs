use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use url::Url;

use crate::config::primitives::{LogFormat, Store, Targets};

impl Args {
    pub(super) fn into_output(self) -> Output {
        let Args {
            config_file,
            log_format,
            log_targets,
            log_spans,
            opentelemetry_url,
            opentelemetry_service_name,
            opentelemetry_targets,
            metrics_prometheus_address,
            save_to,
            command,
        } = self;

        let tracing = Tracing {
            logging: Logging {
                format: log_format,
                targets: log_targets,
                log_spans,
            },
            opentelemetry: OpenTelemetry {
                url: opentelemetry_url,
                service_name: opentelemetry_service_name,
                targets: opentelemetry_targets,
            },
        };

        let metrics = Metrics {
            prometheus_address: metrics_prometheus_address,
        };

        match command {
            Command::Run(Run {
                address,
                max_file_size,
                process_timeout,
                store,
            }) => Output {
                config_format: ConfigFormat {
                    server: Server { address },
                    tracing,
                    metrics,
                    media: Media {
                        max_file_size,
                        process_timeout,
                    },
                    store,
                },
                operation: Operation::Run,
                save_to,
                config_file,
            },
        }
    }
}

pub(super) struct Output {
    pub(super) config_format: ConfigFormat,
    pub(super) operation: Operation,
    pub(super) save_to: Option<PathBuf>,
    pub(super) config_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub(crate) enum Operation {
    Run,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) struct ConfigFormat {
    server: Server,
    tracing: Tracing,
    metrics: Metrics,
    media: Media,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<Store>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<SocketAddr>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    prometheus_address: Option<SocketAddr>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Tracing {
    logging: Logging,

    opentelemetry: OpenTelemetry,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Logging {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<LogFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Targets>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    log_spans: bool,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct OpenTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,

    #[serde(skip_serializing_if = "Option::is_none")]
    service_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Targets>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_file_size: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    process_timeout: Option<u64>,
}

/// Run the vid-rs video processing web server
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(super) struct Args {
    /// Path to the vid-rs configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Format of logs printed to stdout
    #[arg(long)]
    log_format: Option<LogFormat>,
    /// Log levels to print to stdout, respects RUST_LOG formatting
    #[arg(long)]
    log_targets: Option<Targets>,
    /// Whether to log opening and closing of spans to stdout
    #[arg(long)]
    log_spans: bool,

    /// URL to send OpenTelemetry traces
    #[arg(long)]
    opentelemetry_url: Option<Url>,
    /// Service Name to use for OpenTelemetry
    #[arg(long)]
    opentelemetry_service_name: Option<String>,
    /// Log levels to use for OpenTelemetry, respects RUST_LOG formatting
    #[arg(long)]
    opentelemetry_targets: Option<Targets>,

    /// File to save the current configuration for reproducible runs
    #[arg(long)]
    save_to: Option<PathBuf>,

    /// Address and port to expose prometheus metrics
    #[arg(long)]
    metrics_prometheus_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the vid-rs web server
    Run(Run),
}

#[derive(Debug, Parser)]
struct Run {
    /// The address and port to bind the vid-rs web server
    #[arg(short, long)]
    address: Option<SocketAddr>,

    /// The maximum size, in megabytes, of accepted uploads
    #[arg(long)]
    max_file_size: Option<usize>,

    /// How long, in seconds, spawned ffmpeg commands are allowed to run before
    /// they are killed
    #[arg(long)]
    process_timeout: Option<u64>,

    #[command(subcommand)]
    store: Option<Store>,
}

use std::{net::SocketAddr, path::PathBuf};

use crate::config::primitives::{LogFormat, Targets};

#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct Defaults {
    server: ServerDefaults,
    tracing: TracingDefaults,
    media: MediaDefaults,
    store: StoreDefaults,
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct ServerDefaults {
    address: SocketAddr,
}

impl Default for ServerDefaults {
    fn default() -> ServerDefaults {
        ServerDefaults {
            address: "0.0.0.0:3000".parse().expect("Valid address string"),
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct TracingDefaults {
    logging: LoggingDefaults,

    opentelemetry: OpenTelemetryDefaults,
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct LoggingDefaults {
    format: LogFormat,
    targets: Targets,
    log_spans: bool,
}

impl Default for LoggingDefaults {
    fn default() -> LoggingDefaults {
        LoggingDefaults {
            format: LogFormat::Normal,
            targets: "warn,tracing_actix_web=info,actix_web=info,actix_server=info"
                .parse()
                .expect("Valid targets string"),
            log_spans: false,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct OpenTelemetryDefaults {
    service_name: String,
    targets: Targets,
}

impl Default for OpenTelemetryDefaults {
    fn default() -> OpenTelemetryDefaults {
        OpenTelemetryDefaults {
            service_name: String::from("vid-rs"),
            targets: "info".parse().expect("Valid targets string"),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct MediaDefaults {
    max_file_size: usize,
    process_timeout: u64,
}

impl Default for MediaDefaults {
    fn default() -> MediaDefaults {
        MediaDefaults {
            max_file_size: 40,
            process_timeout: 900,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
enum StoreDefaults {
    Filesystem(FilesystemDefaults),
}

impl Default for StoreDefaults {
    fn default() -> StoreDefaults {
        StoreDefaults::Filesystem(FilesystemDefaults::default())
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct FilesystemDefaults {
    path: PathBuf,
    incoming: PathBuf,
    outgoing: PathBuf,
}

impl Default for FilesystemDefaults {
    fn default() -> FilesystemDefaults {
        FilesystemDefaults {
            path: PathBuf::from(String::from(".")),
            incoming: PathBuf::from(String::from("incoming")),
            outgoing: PathBuf::from(String::from("outgoing")),
        }
    }
}

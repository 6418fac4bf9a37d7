use std::{fmt::Display, path::PathBuf, str::FromStr};

use clap::ValueEnum;
use tracing::metadata::LevelFilter;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogFormat {
    Compact,
    Json,
    Normal,
    Pretty,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// Log level directives in `RUST_LOG` syntax.
#[derive(Clone, Debug)]
pub(crate) struct Targets {
    pub(crate) targets: tracing_subscriber::filter::Targets,
}

impl FromStr for Targets {
    type Err = <tracing_subscriber::filter::Targets as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Targets {
            targets: s.parse()?,
        })
    }
}

impl Display for Targets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let targets = self
            .targets
            .iter()
            .map(|(path, level)| format!("{path}={level}"))
            .collect::<Vec<_>>()
            .join(",");

        // The default level is not part of the iterator, probe for it instead
        let max_level = [
            LevelFilter::TRACE,
            LevelFilter::DEBUG,
            LevelFilter::INFO,
            LevelFilter::WARN,
            LevelFilter::ERROR,
        ]
        .iter()
        .fold(None, |found, level| {
            if found.is_none()
                && level.into_level().is_some_and(|level| {
                    self.targets
                        .would_enable("not_a_real_target_so_nothing_can_conflict", &level)
                })
            {
                Some(level.to_string())
            } else {
                found
            }
        });

        if let Some(level) = max_level {
            if !targets.is_empty() {
                write!(f, "{level},{targets}")
            } else {
                write!(f, "{level}")
            }
        } else if !targets.is_empty() {
            write!(f, "{targets}")
        } else {
            Ok(())
        }
    }
}

impl serde::Serialize for Targets {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Targets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize, clap::Subcommand)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub(crate) enum Store {
    /// Run vid-rs with filesystem storage
    Filesystem(Filesystem),
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize, clap::Parser)]
#[serde(rename_all = "snake_case")]
pub(crate) struct Filesystem {
    /// Directory vid-rs keeps its incoming and outgoing namespaces in
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<PathBuf>,

    /// Where uploaded videos are placed, relative to the storage path
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) incoming: Option<PathBuf>,

    /// Where converted and trimmed videos are placed, relative to the storage
    /// path
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) outgoing: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::Targets;

    #[test]
    fn bare_level_round_trips() {
        let targets: Targets = "info".parse().expect("Valid targets");

        assert_eq!(targets.to_string(), "info");
    }

    #[test]
    fn named_target_round_trips() {
        let targets: Targets = "warn,tracing_actix_web=info".parse().expect("Valid targets");

        assert_eq!(targets.to_string(), "warn,tracing_actix_web=info");
    }
}

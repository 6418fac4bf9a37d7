mod commandline;
mod defaults;
mod file;
mod primitives;

use std::path::{Path, PathBuf};

use clap::Parser;

use commandline::{Args, Output};
use defaults::Defaults;

pub(crate) use commandline::Operation;
pub(crate) use file::{ConfigFile as Configuration, Filesystem, Store, Tracing};
pub(crate) use primitives::LogFormat;

/// Where vid-rs configuration is loaded from
pub struct ConfigSource<P, T> {
    config_file: Option<P>,
    custom_struct: Option<T>,
}

impl<T> ConfigSource<PathBuf, T>
where
    T: serde::Serialize,
{
    /// Create a new memory source
    pub fn memory(custom_struct: T) -> Self {
        ConfigSource {
            config_file: None,
            custom_struct: Some(custom_struct),
        }
    }
}

impl<P> ConfigSource<P, ()>
where
    P: AsRef<Path>,
{
    /// Create a new path source
    pub fn path(config_file: P) -> Self {
        ConfigSource {
            config_file: Some(config_file),
            custom_struct: None,
        }
    }
}

/// The configuration and operation vid-rs was asked to run with
pub struct VidRsConfiguration {
    pub(crate) config: Configuration,
    pub(crate) operation: Operation,
}

pub(super) fn configure_without_clap<P, T, Q>(
    source: ConfigSource<P, T>,
    save_to: Option<Q>,
) -> color_eyre::Result<VidRsConfiguration>
where
    P: AsRef<Path>,
    T: serde::Serialize,
    Q: AsRef<Path>,
{
    let config = config::Config::builder().add_source(config::File::from_str(
        &serde_json::to_string(&Defaults::default())?,
        config::FileFormat::Json,
    ));

    let config = match (source.config_file, source.custom_struct) {
        (_, Some(custom)) => config.add_source(config::File::from_str(
            &serde_json::to_string(&custom)?,
            config::FileFormat::Json,
        )),
        (Some(path), None) => config.add_source(config::File::from(path.as_ref())),
        (None, None) => config,
    };

    let built = config
        .add_source(config::Environment::with_prefix("VIDRS").separator("__"))
        .build()?;

    let config: Configuration = built.try_deserialize()?;

    save_configuration(&config, save_to)?;

    Ok(VidRsConfiguration {
        config,
        operation: Operation::Run,
    })
}

pub(super) fn configure() -> color_eyre::Result<VidRsConfiguration> {
    let Output {
        config_format,
        operation,
        save_to,
        config_file,
    } = Args::parse().into_output();

    let config = config::Config::builder().add_source(config::File::from_str(
        &serde_json::to_string(&Defaults::default())?,
        config::FileFormat::Json,
    ));

    let config = if let Some(config_file) = config_file {
        config.add_source(config::File::from(config_file))
    } else {
        config
    };

    let built = config
        .add_source(config::Environment::with_prefix("VIDRS").separator("__"))
        .add_source(config::File::from_str(
            &serde_json::to_string(&config_format)?,
            config::FileFormat::Json,
        ))
        .build()?;

    let config: Configuration = built.try_deserialize()?;

    save_configuration(&config, save_to)?;

    Ok(VidRsConfiguration { config, operation })
}

fn save_configuration<Q>(config: &Configuration, save_to: Option<Q>) -> color_eyre::Result<()>
where
    Q: AsRef<Path>,
{
    if let Some(save_to) = save_to {
        let output = toml::to_string_pretty(config)?;

        std::fs::write(save_to, output)?;
    }

    Ok(())
}

mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{
    DatastoreSettings, HttpSettings, LogSettings, RelaySettings, Settings,
};

/// Default location of the optional configuration file (extension resolved by `config`).
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Prefix of the environment variables read on top of the file, e.g. `FORMRELAY_RELAY__PORT`.
pub const ENV_PREFIX: &str = "FORMRELAY";

/// Loads the configuration from `path` (or the default file) and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the http, relay, datastore and log configurations
pub fn load_config(path: Option<&str>) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;

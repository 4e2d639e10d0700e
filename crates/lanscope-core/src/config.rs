//! Configuration management for lanscope services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`<PREFIX>_<SECTION>__<KEY>`)
//! 2. Config file (`<file_prefix>.toml`, optional)
//! 3. Defaults

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Load one section of the layered configuration.
///
/// A missing file or missing section yields `T::default()`. A section that is
/// present but malformed is an error.
pub fn load_section<T>(file_prefix: &str, env_prefix: &str, section: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<T>(section) {
        Ok(c) => Ok(c),
        Err(config::ConfigError::NotFound(_)) => {
            tracing::debug!(section, "Config section not found, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load layered settings for a service.
///
/// Sources, lowest precedence first: `<config_dir>/base.yaml` (optional), then
/// `APP_`-prefixed environment variables with `__` as the nesting separator
/// (e.g. `APP_SERVER__PORT=9000`).
pub fn load<T: DeserializeOwned>(config_dir: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

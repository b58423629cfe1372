use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load layered settings for a service.
///
/// Sources, lowest precedence first:
/// 1. `<config_dir>/base.yaml` (required)
/// 2. `<config_dir>/local.yaml` (optional, for developer overrides)
/// 3. `APP_`-prefixed environment variables, `__` separating nested keys
///    (e.g. `APP_SERVER__PORT=9000`)
///
/// A `.env` file in the working directory is loaded into the environment first.
pub fn load_layered<T: DeserializeOwned>(config_dir: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(true))
        .add_source(File::from(config_dir.join("local.yaml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Resolve the configuration directory of a workspace member.
///
/// Works both when the process runs from the workspace root and from the
/// member directory itself (as `cargo test` does).
pub fn config_dir_for(member: &str) -> Result<std::path::PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(member) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(member).join("config"))
    }
}

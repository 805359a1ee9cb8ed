use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories, an initial `config.json` and an empty
/// database.
///
/// # Arguments
/// - `dues_home` - The directory that will be the root of the data directory, e.g. `$HOME/dues`
/// - `community` - The name of the residential community
///
/// # Errors
/// - Returns an error if any file operations fail, or if `dues_home` already has a database.
pub async fn init(dues_home: &Path, community: &str) -> Result<Out<()>> {
    let config = Config::create(dues_home, community)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the dues directory for {} at {}",
        config.community_name(),
        config.root().display()
    )
    .into())
}

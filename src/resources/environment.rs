use anyhow::*;

use crate::resources::AssetLoader;

/// Load an equirectangular `.hdr` panorama and turn it into a filtered environment.
///
/// The result serves both as image based lighting and as the visible background.
pub async fn load_environment<L: AssetLoader>(loader: &L, path: &str) -> Result<L::Environment> {
    let bytes = loader.load_binary(path).await?;
    let environment = loader.decode_environment(&bytes, path)?;
    log::info!("environment {path} loaded ({} bytes)", bytes.len());
    Ok(environment)
}

use anyhow::*;

use crate::data_structures::texture::ColorSpace;

/**
 * This module contains all logic for loading textures, environments and models from external files.
 *
 * Every stage loader is a free async function generic over [`AssetLoader`], which decides where
 * bytes come from and what a decoded texture is (a CPU image or a GPU texture).
 */
pub mod environment;
pub mod loaders;
pub mod model;
pub mod texture;

/// Source of asset bytes and decoder of textures and environments.
///
/// `Texture` and `Environment` are handles, cheap to clone, since a single loaded
/// texture can end up in many material slots.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    type Texture: Clone;
    type Environment: Clone;

    /// Read the file at `path`, relative to the asset root.
    async fn load_binary(&self, path: &str) -> Result<Vec<u8>>;

    /// `format` is a file extension hint such as "png". If `None`, the format is guessed.
    fn decode_texture(
        &self,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        color_space: ColorSpace,
    ) -> Result<Self::Texture>;

    fn decode_environment(&self, bytes: &[u8], label: &str) -> Result<Self::Environment>;
}

/// File extension of `path` (without the dot), used as a decoder hint.
pub(crate) fn extension_of(path: &str) -> Option<&str> {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow!("page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

/// Read an asset below `root`: a directory on native targets, a path below the
/// page origin on the web.
pub async fn load_binary(root: &str, file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(root).join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(data)
}

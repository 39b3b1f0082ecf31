//! Loading a folder of named textures as one batch.
//!
//! A batch issues every texture load at once and completes when the last one has
//! settled. It succeeds only if every requested name resolved; otherwise it fails
//! as a whole and reports each name that could not be found under any extension.

use std::collections::BTreeMap;
use std::fmt;

use crate::{
    data_structures::texture::ColorSpace,
    resources::{AssetLoader, extension_of},
};

/// One logical texture within a folder, e.g. `metal/roughness`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRequest {
    pub folder: String,
    pub name: String,
}

impl TextureRequest {
    pub fn new(folder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }

    /// The paths to try, in order of preference.
    pub fn candidates(&self, extensions: &[String]) -> Vec<String> {
        extensions
            .iter()
            .map(|ext| format!("textures/{}/{}.{}", self.folder, self.name, ext))
            .collect()
    }
}

/// A requested texture that resolved under none of the extensions.
#[derive(Debug)]
pub struct MissingTexture {
    pub name: String,
    pub attempts: Vec<String>,
    pub last_error: Option<anyhow::Error>,
}

impl fmt::Display for MissingTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tried {})", self.name, self.attempts.join(", "))?;
        if let Some(err) = &self.last_error {
            write!(f, ": {err:#}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load textures [{}] from folder {folder}", names(.missing))]
pub struct TextureBatchError {
    pub folder: String,
    pub missing: Vec<MissingTexture>,
}

fn names(missing: &[MissingTexture]) -> String {
    missing
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TextureBatchError {
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Loaded textures keyed by logical name.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureBatch<T> {
    pub folder: String,
    textures: BTreeMap<String, LoadedTexture<T>>,
}

/// A texture together with the path it was actually loaded from.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedTexture<T> {
    pub path: String,
    pub texture: T,
}

impl<T> TextureBatch<T> {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            textures: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>, texture: T) {
        self.textures.insert(
            name.into(),
            LoadedTexture {
                path: path.into(),
                texture,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.textures.get(name).map(|loaded| &loaded.texture)
    }

    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.textures.get(name).map(|loaded| loaded.path.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Try each candidate path of one request in order until one loads and decodes.
async fn load_one<L: AssetLoader>(
    loader: &L,
    request: &TextureRequest,
    extensions: &[String],
) -> Result<LoadedTexture<L::Texture>, MissingTexture> {
    let attempts = request.candidates(extensions);
    let mut last_error = None;
    for path in &attempts {
        let loaded = match loader.load_binary(path).await {
            Ok(bytes) => loader.decode_texture(&bytes, path, extension_of(path), ColorSpace::Linear),
            Err(err) => Err(err),
        };
        match loaded {
            Ok(texture) => {
                log::debug!("texture {} loaded from {}", request.name, path);
                return Ok(LoadedTexture {
                    path: path.clone(),
                    texture,
                });
            }
            Err(err) => {
                log::debug!("texture {} not available at {}: {:#}", request.name, path, err);
                last_error = Some(err);
            }
        }
    }
    Err(MissingTexture {
        name: request.name.clone(),
        attempts,
        last_error,
    })
}

/// Load `textures/<folder>/<name>.<ext>` for every name, trying `extensions` in order.
///
/// All loads run concurrently. Duplicate names are loaded once.
pub async fn load_texture_batch<L: AssetLoader>(
    loader: &L,
    folder: &str,
    names: &[String],
    extensions: &[String],
) -> Result<TextureBatch<L::Texture>, TextureBatchError> {
    let mut requests: Vec<TextureRequest> = Vec::with_capacity(names.len());
    for name in names {
        if requests.iter().any(|r| &r.name == name) {
            log::warn!("texture {name} requested twice from folder {folder}, loading it once");
            continue;
        }
        requests.push(TextureRequest::new(folder, name.clone()));
    }

    let results = futures::future::join_all(
        requests
            .iter()
            .map(|request| load_one(loader, request, extensions)),
    )
    .await;

    let mut batch = TextureBatch::new(folder);
    let mut missing = Vec::new();
    for (request, result) in requests.into_iter().zip(results) {
        match result {
            Ok(loaded) => {
                batch.textures.insert(request.name, loaded);
            }
            Err(miss) => missing.push(miss),
        }
    }

    if !missing.is_empty() {
        return Err(TextureBatchError {
            folder: folder.to_string(),
            missing,
        });
    }
    Ok(batch)
}

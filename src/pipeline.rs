//! The asset pipeline: environment, then model, then textures.
//!
//! Stages run strictly one after the other. Each completed stage is reported
//! through a sink as a [`SceneEvent`] so the owner of the scene can apply it;
//! the pipeline itself never holds the scene. The first failing stage ends the
//! run and is returned as a [`PipelineError`]. Nothing is retried.

use crate::{
    config::AssetConfig,
    resources::{
        AssetLoader,
        environment::load_environment,
        model::load_model_gltf,
        texture::{TextureBatchError, load_texture_batch},
    },
    scene::SceneEvent,
};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to load environment {path}: {source:#}")]
    Environment {
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load model {path}: {source:#}")]
    Model {
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Textures(#[from] TextureBatchError),
}

/// Which stages completed in a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub environment: bool,
    pub model: bool,
    pub textures: bool,
}

/// Run every stage for `assets`, handing each result to `sink` as soon as it is ready.
///
/// Returns the failing stage on error; events for the stages before it have
/// already been delivered.
pub async fn run<L, F>(
    loader: &L,
    assets: &AssetConfig,
    mut sink: F,
) -> Result<PipelineReport, PipelineError>
where
    L: AssetLoader,
    F: FnMut(SceneEvent<L::Texture, L::Environment>),
{
    let mut report = PipelineReport::default();

    let environment = load_environment(loader, &assets.environment)
        .await
        .map_err(|source| PipelineError::Environment {
            path: assets.environment.clone(),
            source,
        })?;
    sink(SceneEvent::Environment(environment));
    report.environment = true;

    let model = load_model_gltf(loader, &assets.model)
        .await
        .map_err(|source| PipelineError::Model {
            path: assets.model.clone(),
            source,
        })?;
    let model_name = model.name.clone();
    sink(SceneEvent::ModelLoaded(model));
    report.model = true;

    let textures = load_texture_batch(
        loader,
        &assets.textures.folder,
        &assets.textures.names,
        &assets.extensions,
    )
    .await?;
    log::info!(
        "texture batch {} loaded: {} textures",
        textures.folder,
        textures.len()
    );
    sink(SceneEvent::TexturesLoaded {
        model: model_name,
        textures,
    });
    report.textures = true;

    Ok(report)
}

//! The scene: everything the presenter draws each frame.
//!
//! The scene is owned by the event loop. Asset pipeline stages never touch it
//! directly; they produce [`SceneEvent`]s which are applied here, on the loop's
//! thread, one at a time. That makes the event loop the only writer.

use crate::{
    binder::{BindReport, bind_materials},
    config::{Light, SceneConfig, SlotBindings},
    data_structures::scene_graph::ModelScene,
    resources::texture::TextureBatch,
};

/// Completion of one asset pipeline stage.
#[derive(Debug)]
pub enum SceneEvent<T, E> {
    /// The filtered environment is ready for lighting and background.
    Environment(E),
    /// A model was loaded and should be attached, untextured for now.
    ModelLoaded(ModelScene<T>),
    /// The texture batch for the model with this name is ready to be bound.
    TexturesLoaded {
        model: String,
        textures: TextureBatch<T>,
    },
}

#[derive(Debug)]
pub struct Scene<T, E> {
    pub lights: Vec<Light>,
    pub environment: Option<E>,
    pub background: Option<E>,
    pub clear_colour: wgpu::Color,
    pub bindings: SlotBindings,
    pub models: Vec<ModelScene<T>>,
}

impl<T: Clone, E: Clone> Scene<T, E> {
    pub fn new(config: &SceneConfig) -> Self {
        log::info!("scene set up with {} lights", config.lights.len());
        Self {
            lights: config.lights.clone(),
            environment: None,
            background: None,
            clear_colour: config.clear_colour,
            bindings: config.bindings.clone(),
            models: Vec::new(),
        }
    }

    pub fn set_environment(&mut self, environment: E) {
        self.background = Some(environment.clone());
        self.environment = Some(environment);
    }

    pub fn attach(&mut self, model: ModelScene<T>) {
        match model.bounds() {
            Some(bounds) => log::info!(
                "model {} attached: {} nodes, {} materials, centre {:?}, extent {:?}",
                model.name,
                model.node_count(),
                model.materials.len(),
                bounds.centre(),
                bounds.extent()
            ),
            None => log::info!(
                "model {} attached: {} nodes, {} materials, no geometry",
                model.name,
                model.node_count(),
                model.materials.len()
            ),
        }
        self.models.push(model);
    }

    pub fn model(&self, name: &str) -> Option<&ModelScene<T>> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Bind a texture batch to the attached model called `model`.
    pub fn bind(&mut self, model: &str, textures: &TextureBatch<T>) -> Option<BindReport> {
        let bindings = &self.bindings;
        let target = self.models.iter_mut().find(|m| m.name == model);
        match target {
            Some(target) => Some(bind_materials(target, textures, bindings)),
            None => {
                log::warn!("textures from {} arrived for {model}, which is not attached", textures.folder);
                None
            }
        }
    }

    pub fn apply(&mut self, event: SceneEvent<T, E>) {
        match event {
            SceneEvent::Environment(environment) => {
                self.set_environment(environment);
                log::info!("environment and background updated");
            }
            SceneEvent::ModelLoaded(model) => self.attach(model),
            SceneEvent::TexturesLoaded { model, textures } => {
                self.bind(&model, &textures);
            }
        }
    }

    /// Lower the `needs_update` flag of every material and return how many were raised.
    pub fn take_material_updates(&mut self) -> usize {
        let mut updated = 0;
        for material in self.models.iter_mut().flat_map(|m| m.materials.iter_mut()) {
            if material.needs_update {
                material.needs_update = false;
                updated += 1;
            }
        }
        updated
    }
}

//! showroom
//!
//! A car showroom viewer: an HDR environment, a glTF car model and a set of
//! material textures are loaded one after the other and combined into a scene
//! that can be orbited with the mouse. Runs natively and in the browser.
//!
//! Loading is decoupled from the GPU through [`resources::AssetLoader`], so the
//! asset pipeline, the material binding and the frame driver can all be used
//! and tested without a window.
//!
//! High-level modules
//! - `binder`: assigns loaded textures and scalars to materials by role
//! - `camera`: perspective camera, camera uniform and orbit controls
//! - `config`: scene configuration and the showroom defaults
//! - `context`: window, surface and device, presents frames
//! - `data_structures`: materials, scene graph, environment maps, textures
//! - `flow`: frame driver and the winit application
//! - `pipeline`: the sequential environment, model and texture stages
//! - `resources`: asset loaders for textures, environments and glTF models
//! - `scene`: the scene owned by the event loop and the events that change it
//!

pub mod binder;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipeline;
pub mod resources;
pub mod scene;

pub use config::SceneConfig;
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

//! Scene configuration.
//!
//! Everything the showroom needs to know up front: where assets live, how the
//! camera and its orbit controls behave, which lights illuminate the scene and
//! which loaded texture feeds which material slot. [`SceneConfig::default`]
//! describes the car showroom.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use crate::data_structures::material::TextureSlot;

/// A named set of textures below `textures/<folder>/`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSetConfig {
    pub folder: String,
    pub names: Vec<String>,
}

impl Default for TextureSetConfig {
    fn default() -> Self {
        Self {
            folder: "metal".to_string(),
            names: ["ao", "color", "height", "mettalic", "normal", "roughness"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetConfig {
    /// Directory (native) or origin-relative path (web) all asset paths are relative to.
    pub root: String,
    pub environment: String,
    pub model: String,
    pub textures: TextureSetConfig,
    /// Texture file extensions, in order of preference.
    pub extensions: Vec<String>,
    /// Flip decoded textures vertically. glTF UVs expect unflipped images.
    pub flip_y: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            environment: "hdr/little_paris_eiffel_tower_4k.hdr".to_string(),
            model: "models/car/audi_futuristic_concept_car.glb".to_string(),
            textures: TextureSetConfig::default(),
            extensions: vec!["jpg".to_string(), "png".to_string()],
            flip_y: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov_y: cgmath::Deg<f32>,
    pub near: f32,
    pub far: f32,
    pub position: cgmath::Point3<f32>,
    pub target: cgmath::Point3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: cgmath::Deg(75.0),
            near: 0.1,
            far: 1000.0,
            position: cgmath::Point3::new(0.0, 0.0, 5.0),
            target: cgmath::Point3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    /// Share of the pending motion applied per update when damping is on.
    pub damping_factor: f32,
    /// Pan in screen space instead of along the ground plane.
    pub screen_space_panning: bool,
    /// Radians from the up axis.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.25,
            screen_space_panning: false,
            min_polar_angle: 0.0,
            max_polar_angle: PI / 2.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

/// RGB, each channel in `0..=1`.
pub type Colour = [f32; 3];

/// `0xRRGGBB` to float RGB in `0..=1`.
pub const fn hex(rgb: u32) -> Colour {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient {
        colour: Colour,
        intensity: f32,
    },
    Directional {
        colour: Colour,
        intensity: f32,
        position: [f32; 3],
    },
    Point {
        colour: Colour,
        intensity: f32,
        /// Range after which the light has no influence, 0 for unlimited.
        distance: f32,
        decay: f32,
        position: [f32; 3],
    },
    Spot {
        colour: Colour,
        intensity: f32,
        distance: f32,
        /// Half angle of the cone in radians.
        angle: f32,
        penumbra: f32,
        decay: f32,
        position: [f32; 3],
        target: [f32; 3],
    },
    Hemisphere {
        sky: Colour,
        ground: Colour,
        intensity: f32,
    },
}

fn showroom_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            colour: hex(0x404040),
            intensity: 1.5,
        },
        Light::Directional {
            colour: hex(0xffffff),
            intensity: 3.0,
            position: [5.0, 5.0, 5.0],
        },
        Light::Point {
            colour: hex(0xffffff),
            intensity: 3.0,
            distance: 100.0,
            decay: 2.0,
            position: [5.0, 5.0, 5.0],
        },
        Light::Spot {
            colour: hex(0xffffff),
            intensity: 5.0,
            distance: 500.0,
            angle: PI / 6.0,
            penumbra: 0.1,
            decay: 1.0,
            position: [5.0, 10.0, 5.0],
            target: [0.0, 0.0, 0.0],
        },
        Light::Hemisphere {
            sky: hex(0x4040ff),
            ground: hex(0x404040),
            intensity: 2.0,
        },
    ]
}

/// Which logical texture of the loaded batch feeds which material slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotBindings(pub BTreeMap<TextureSlot, String>);

impl SlotBindings {
    pub fn texture_for(&self, slot: TextureSlot) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }
}

impl Default for SlotBindings {
    fn default() -> Self {
        Self(BTreeMap::from([
            (TextureSlot::Color, "color".to_string()),
            (TextureSlot::Normal, "normal".to_string()),
            (TextureSlot::AmbientOcclusion, "ao".to_string()),
            // the metalness map ships as `mettalic.<ext>`
            (TextureSlot::Metalness, "mettalic".to_string()),
            (TextureSlot::Roughness, "roughness".to_string()),
            (TextureSlot::Height, "height".to_string()),
        ]))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lights: Vec<Light>,
    pub clear_colour: wgpu::Color,
    pub bindings: SlotBindings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lights: showroom_lights(),
            clear_colour: wgpu::Color::BLACK,
            bindings: SlotBindings::default(),
        }
    }
}

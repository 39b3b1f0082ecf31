//! Materials and their texture slots.
//!
//! A [`Material`] is shared by every mesh that references it by index in its
//! [`ModelScene`](crate::data_structures::scene_graph::ModelScene). The texture
//! handle type `T` is generic so that material state can be built and mutated
//! without a GPU (tests, headless loading) and with `Arc<Texture>` at runtime.

use std::fmt;

/// What a material is used for on the model, resolved once from its name at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialRole {
    /// Glass parts: named `windows`.
    Windows,
    /// Painted body panels: named `carbody`.
    CarBody,
    Other,
}

impl MaterialRole {
    pub const WINDOWS: &'static str = "windows";
    pub const CAR_BODY: &'static str = "carbody";

    pub fn from_name(name: &str) -> Self {
        match name {
            Self::WINDOWS => Self::Windows,
            Self::CAR_BODY => Self::CarBody,
            _ => Self::Other,
        }
    }

    /// The slots the binder fills for this role. `Other` receives no textures.
    pub fn bound_slots(self) -> &'static [TextureSlot] {
        match self {
            Self::Windows => &TextureSlot::ALL,
            Self::CarBody => &[
                TextureSlot::Color,
                TextureSlot::Normal,
                TextureSlot::AmbientOcclusion,
                TextureSlot::Metalness,
                TextureSlot::Roughness,
            ],
            Self::Other => &[],
        }
    }
}

/// The light response model of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Metalness/roughness driven.
    PhysicallyBased,
    /// `KHR_materials_unlit`: flat colour, no lighting.
    Unlit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

/// A named binding point on a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    Color,
    Normal,
    AmbientOcclusion,
    Metalness,
    Roughness,
    Height,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 6] = [
        TextureSlot::Color,
        TextureSlot::Normal,
        TextureSlot::AmbientOcclusion,
        TextureSlot::Metalness,
        TextureSlot::Roughness,
        TextureSlot::Height,
    ];
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureSlot::Color => "color",
            TextureSlot::Normal => "normal",
            TextureSlot::AmbientOcclusion => "ao",
            TextureSlot::Metalness => "metalness",
            TextureSlot::Roughness => "roughness",
            TextureSlot::Height => "height",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureSlots<T> {
    pub color: Option<T>,
    pub normal: Option<T>,
    pub ambient_occlusion: Option<T>,
    pub metalness: Option<T>,
    pub roughness: Option<T>,
    pub height: Option<T>,
}

impl<T> Default for TextureSlots<T> {
    fn default() -> Self {
        Self {
            color: None,
            normal: None,
            ambient_occlusion: None,
            metalness: None,
            roughness: None,
            height: None,
        }
    }
}

impl<T> TextureSlots<T> {
    pub fn get(&self, slot: TextureSlot) -> Option<&T> {
        match slot {
            TextureSlot::Color => self.color.as_ref(),
            TextureSlot::Normal => self.normal.as_ref(),
            TextureSlot::AmbientOcclusion => self.ambient_occlusion.as_ref(),
            TextureSlot::Metalness => self.metalness.as_ref(),
            TextureSlot::Roughness => self.roughness.as_ref(),
            TextureSlot::Height => self.height.as_ref(),
        }
    }

    pub fn set(&mut self, slot: TextureSlot, texture: Option<T>) {
        let target = match slot {
            TextureSlot::Color => &mut self.color,
            TextureSlot::Normal => &mut self.normal,
            TextureSlot::AmbientOcclusion => &mut self.ambient_occlusion,
            TextureSlot::Metalness => &mut self.metalness,
            TextureSlot::Roughness => &mut self.roughness,
            TextureSlot::Height => &mut self.height,
        };
        *target = texture;
    }

    pub fn bound(&self) -> usize {
        TextureSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_some())
            .count()
    }
}

/// Surface description of a mesh.
///
/// Scalars default to the glTF defaults. `needs_update` is raised whenever the
/// material is changed after loading and lowered by the presenter once it has
/// picked up the change.
#[derive(Clone, Debug, PartialEq)]
pub struct Material<T> {
    pub name: String,
    pub role: MaterialRole,
    pub shading: Shading,
    pub slots: TextureSlots<T>,
    pub base_colour: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub blend: BlendMode,
    pub needs_update: bool,
}

impl<T> Material<T> {
    pub fn new(name: impl Into<String>, shading: Shading) -> Self {
        let name = name.into();
        Self {
            role: MaterialRole::from_name(&name),
            name,
            shading,
            slots: TextureSlots::default(),
            base_colour: [1.0; 4],
            metalness: 1.0,
            roughness: 1.0,
            opacity: 1.0,
            transparent: false,
            blend: BlendMode::Normal,
            needs_update: false,
        }
    }

    pub fn is_physically_based(&self) -> bool {
        self.shading == Shading::PhysicallyBased
    }
}

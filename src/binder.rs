//! Assigning a loaded texture batch to the materials of a model.
//!
//! Every node of the model is visited once. Only mesh nodes whose material is
//! physically based are touched; what happens to their material depends on its
//! [`MaterialRole`]:
//!
//! | role      | textures                                       | metalness | roughness | transparency        |
//! |-----------|------------------------------------------------|-----------|-----------|---------------------|
//! | `Windows` | color, normal, ao, metalness, roughness, height | 0.0       | 0.6       | on, opacity 0.5     |
//! | `CarBody` | color, normal, ao, metalness, roughness         | 1.0       | 0.3       | unchanged           |
//! | `Other`   | none                                           | 1.0       | 0.3       | unchanged           |
//!
//! Binding only ever assigns absolute values, so binding the same batch twice
//! leaves the model exactly as binding it once.

use crate::{
    config::SlotBindings,
    data_structures::{
        material::{BlendMode, Material, MaterialRole},
        scene_graph::{ModelScene, Node},
    },
    resources::texture::TextureBatch,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Every node of the graph, groups included.
    pub visited: usize,
    /// Meshes whose material was updated.
    pub bound: usize,
    /// Meshes left alone because their material is not physically based.
    pub skipped: usize,
}

fn apply_role<T: Clone>(material: &mut Material<T>, textures: &TextureBatch<T>, bindings: &SlotBindings) {
    for &slot in material.role.bound_slots() {
        let texture = bindings
            .texture_for(slot)
            .and_then(|name| textures.get(name))
            .cloned();
        if texture.is_none() {
            log::debug!("nothing to bind to the {slot} slot of material {}", material.name);
        }
        material.slots.set(slot, texture);
    }

    match material.role {
        MaterialRole::Windows => {
            material.metalness = 0.0;
            material.roughness = 0.6;
            material.transparent = true;
            material.opacity = 0.5;
            material.blend = BlendMode::Normal;
        }
        MaterialRole::CarBody | MaterialRole::Other => {
            material.metalness = 1.0;
            material.roughness = 0.3;
        }
    }
    material.needs_update = true;
}

/// Bind `textures` to the materials of `model` according to their roles.
pub fn bind_materials<T: Clone>(
    model: &mut ModelScene<T>,
    textures: &TextureBatch<T>,
    bindings: &SlotBindings,
) -> BindReport {
    let ModelScene {
        name,
        root,
        materials,
    } = model;
    let mut report = BindReport::default();

    root.traverse(&mut |node: &Node| {
        report.visited += 1;
        let Some(mesh) = node.as_mesh() else {
            return;
        };
        let Some(material) = materials.get_mut(mesh.material) else {
            log::warn!("mesh {} of {name} refers to missing material {}", node.name, mesh.material);
            return;
        };
        if !material.is_physically_based() {
            report.skipped += 1;
            return;
        }
        log::debug!(
            "binding mesh {} with material {:?} ({:?})",
            node.name,
            material.name,
            material.role
        );
        apply_role(material, textures, bindings);
        report.bound += 1;
    });

    log::info!(
        "bound textures from {} to {name}: {} meshes updated, {} skipped, {} nodes visited",
        textures.folder,
        report.bound,
        report.skipped,
        report.visited
    );
    report
}

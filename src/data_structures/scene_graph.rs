//! Scene graph of a loaded model.
//!
//! A [`ModelScene`] owns a tree of [`Node`]s and the materials they use. Mesh
//! nodes reference their material by index into [`ModelScene::materials`], so a
//! material definition used by several meshes exists exactly once and a change
//! to it is seen by all of them.

use crate::data_structures::{material::Material, transform::Transform};

/// Vertex layout of model geometry as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

/// Triangle geometry of one mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// A renderable mesh: geometry plus exactly one material.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Mesh(mesh),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /// Visits this node and all of its descendants exactly once, parents before children.
    pub fn traverse<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /// Like [`traverse`](Self::traverse) but also hands out the node's world transform.
    pub fn traverse_world(&self, parent: &Transform, visit: &mut dyn FnMut(&Node, &Transform)) {
        let world = parent * &self.transform;
        visit(self, &world);
        for child in &self.children {
            child.traverse_world(&world, visit);
        }
    }
}

/// Axis aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn centre(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn extent(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    fn include(bounds: Option<Bounds>, p: [f32; 3]) -> Bounds {
        match bounds {
            None => Bounds { min: p, max: p },
            Some(Bounds { min, max }) => Bounds {
                min: [min[0].min(p[0]), min[1].min(p[1]), min[2].min(p[2])],
                max: [max[0].max(p[0]), max[1].max(p[1]), max[2].max(p[2])],
            },
        }
    }
}

/// A loaded model: the root of its node tree plus the materials its meshes share.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelScene<T> {
    /// Asset path the model was loaded from. Pipeline events refer to models by it.
    pub name: String,
    pub root: Node,
    pub materials: Vec<Material<T>>,
}

impl<T> ModelScene<T> {
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.traverse(&mut |_| count += 1);
        count
    }

    pub fn meshes(&self) -> Vec<&Node> {
        let mut meshes = Vec::new();
        self.root.traverse(&mut |node| {
            if node.as_mesh().is_some() {
                meshes.push(node);
            }
        });
        meshes
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        let mut found = None;
        self.root.traverse(&mut |node| {
            if found.is_none() && node.name == name {
                found = Some(node);
            }
        });
        found
    }

    /// The material of the first mesh node called `node_name`.
    pub fn material_of(&self, node_name: &str) -> Option<&Material<T>> {
        let mesh = self.find_node(node_name)?.as_mesh()?;
        self.materials.get(mesh.material)
    }

    pub fn material_named(&self, name: &str) -> Option<&Material<T>> {
        self.materials.iter().find(|material| material.name == name)
    }

    /// World space bounds of all mesh vertices, `None` for a model without geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds = None;
        self.root
            .traverse_world(&Transform::default(), &mut |node, world| {
                if let Some(mesh) = node.as_mesh() {
                    for vertex in &mesh.geometry.vertices {
                        bounds = Some(Bounds::include(bounds, world.transform_point(vertex.position)));
                    }
                }
            });
        bounds
    }
}

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};

use crate::{
    data_structures::{
        material::{Material, Shading},
        scene_graph::{Geometry, Mesh, ModelScene, ModelVertex, Node},
        texture::ColorSpace,
        transform::Transform,
    },
    resources::{AssetLoader, extension_of},
};

/// Paths inside a glTF are relative to the file that references them.
fn sibling(file_name: &str, uri: &str) -> String {
    match file_name.rfind('/') {
        Some(idx) => format!("{}/{}", &file_name[..idx], uri),
        None => uri.to_string(),
    }
}

/// Decodes each glTF image at most once per colour space.
struct ImageCache<'a, L: AssetLoader> {
    loader: &'a L,
    file_name: &'a str,
    buffers: &'a [Vec<u8>],
    decoded: HashMap<(usize, ColorSpace), L::Texture>,
}

impl<'a, L: AssetLoader> ImageCache<'a, L> {
    async fn get(&mut self, image: gltf::Image<'_>, color_space: ColorSpace) -> Result<L::Texture> {
        let key = (image.index(), color_space);
        if let Some(texture) = self.decoded.get(&key) {
            return Ok(texture.clone());
        }
        let label = format!("{}#image{}", self.file_name, image.index());
        let texture = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let buffer = self
                    .buffers
                    .get(view.buffer().index())
                    .ok_or_else(|| anyhow!("{label} points to a missing buffer"))?;
                let bytes = buffer
                    .get(view.offset()..view.offset() + view.length())
                    .ok_or_else(|| anyhow!("{label} points outside of its buffer"))?;
                self.loader
                    .decode_texture(bytes, &label, mime_type.split('/').last(), color_space)?
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let path = sibling(self.file_name, uri);
                let bytes = self.loader.load_binary(&path).await?;
                let format = mime_type
                    .and_then(|mt| mt.split('/').last())
                    .or_else(|| extension_of(&path));
                self.loader.decode_texture(&bytes, &path, format, color_space)?
            }
        };
        self.decoded.insert(key, texture.clone());
        Ok(texture)
    }

    /// Embedded textures are optional decoration: a broken one leaves its slot empty.
    async fn slot(
        &mut self,
        material: &str,
        texture: Option<gltf::Texture<'_>>,
        color_space: ColorSpace,
    ) -> Option<L::Texture> {
        let texture = texture?;
        match self.get(texture.source(), color_space).await {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("texture of material {material} in {} could not be loaded: {e:#}", self.file_name);
                None
            }
        }
    }
}

async fn load_material<L: AssetLoader>(
    images: &mut ImageCache<'_, L>,
    material: gltf::Material<'_>,
) -> Material<L::Texture> {
    let name = material.name().unwrap_or_default().to_string();
    let shading = if material.unlit() {
        Shading::Unlit
    } else {
        Shading::PhysicallyBased
    };
    let mut result = Material::new(name.clone(), shading);

    let pbr = material.pbr_metallic_roughness();
    result.base_colour = pbr.base_color_factor();
    result.metalness = pbr.metallic_factor();
    result.roughness = pbr.roughness_factor();
    result.opacity = result.base_colour[3];
    result.transparent = material.alpha_mode() == gltf::material::AlphaMode::Blend;

    let color = pbr.base_color_texture().map(|info| info.texture());
    result.slots.color = images.slot(&name, color, ColorSpace::Srgb).await;
    let normal = material.normal_texture().map(|info| info.texture());
    result.slots.normal = images.slot(&name, normal, ColorSpace::Linear).await;
    let occlusion = material.occlusion_texture().map(|info| info.texture());
    result.slots.ambient_occlusion = images.slot(&name, occlusion, ColorSpace::Linear).await;
    // glTF packs roughness (G) and metalness (B) into one image
    let metallic_roughness = pbr.metallic_roughness_texture().map(|info| info.texture());
    let packed = images
        .slot(&name, metallic_roughness, ColorSpace::Linear)
        .await;
    result.slots.metalness = packed.clone();
    result.slots.roughness = packed;

    result
}

fn read_geometry(primitive: &gltf::Primitive<'_>, buffers: &[Vec<u8>]) -> Geometry {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices = Vec::new();
    if let Some(vertex_attribute) = reader.read_positions() {
        vertex_attribute.for_each(|vertex| {
            vertices.push(ModelVertex {
                position: vertex,
                tex_coords: Default::default(),
                normal: Default::default(),
            })
        });
    }
    if let Some(normal_attribute) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normal_attribute)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coord_attribute) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
        vertices
            .iter_mut()
            .zip(tex_coord_attribute)
            .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
    }

    let indices = match reader.read_indices() {
        Some(indices_raw) => indices_raw.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    Geometry { vertices, indices }
}

/// Builds the scene graph below `node`.
///
/// A glTF mesh may hold several primitives with different materials. A node with
/// a single primitive becomes a mesh node; otherwise it becomes a group with one
/// mesh child per primitive, so that every mesh has exactly one material.
fn to_node<T>(
    node: gltf::Node<'_>,
    buffers: &[Vec<u8>],
    materials: &mut Vec<Material<T>>,
    default_material: &mut Option<usize>,
) -> Node {
    let name = node
        .name()
        .or_else(|| node.mesh().and_then(|mesh| mesh.name()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));

    let mut meshes = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "primitive {} of {name} uses {:?} and is skipped, only triangles are supported",
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }
            let material = match primitive.material().index() {
                Some(idx) => idx,
                None => *default_material.get_or_insert_with(|| {
                    materials.push(Material::new("", Shading::PhysicallyBased));
                    materials.len() - 1
                }),
            };
            meshes.push(Mesh {
                geometry: read_geometry(&primitive, buffers),
                material,
            });
        }
    }

    let mut scene_node = if meshes.len() == 1 {
        let mesh = meshes.remove(0);
        Node::mesh(name, mesh)
    } else {
        let mut group = Node::group(name.clone());
        for (idx, mesh) in meshes.into_iter().enumerate() {
            group.children.push(Node::mesh(format!("{name}_{idx}"), mesh));
        }
        group
    };
    scene_node.transform = Transform::from(node.transform().decomposed());

    for child in node.children() {
        let child_node = to_node(child, buffers, materials, default_material);
        scene_node.children.push(child_node);
    }
    scene_node
}

/// Load a `.glb` or `.gltf` file into a [`ModelScene`] rooted at a group named after the file.
pub async fn load_model_gltf<L: AssetLoader>(
    loader: &L,
    file_name: &str,
) -> Result<ModelScene<L::Texture>> {
    let gltf_bytes = loader.load_binary(file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)
        .with_context(|| format!("{file_name} is not a valid glTF file"))?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| anyhow!("{file_name} references a binary chunk it does not contain"))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    bail!("{file_name} embeds a buffer as data URI, which is not supported");
                }
                let bin = loader.load_binary(&sibling(file_name, uri)).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let mut materials = Vec::new();
    {
        let mut images = ImageCache {
            loader,
            file_name,
            buffers: &buffer_data,
            decoded: HashMap::new(),
        };
        for material in gltf.materials() {
            materials.push(load_material(&mut images, material).await);
        }
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow!("{file_name} contains no scene"))?;

    let mut root = Node::group(file_name);
    let mut default_material = None;
    for node in scene.nodes() {
        let child = to_node(node, &buffer_data, &mut materials, &mut default_material);
        root.children.push(child);
    }

    Ok(ModelScene {
        name: file_name.to_string(),
        root,
        materials,
    })
}

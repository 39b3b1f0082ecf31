#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::task::Poll;

use anyhow::{Result, anyhow, bail};
use showroom::{
    config::AssetConfig,
    data_structures::texture::ColorSpace,
    resources::AssetLoader,
};

/// Bytes that every decoder of [`MemoryLoader`] rejects.
pub const CORRUPT: &[u8] = b"corrupt";

/// Serves files from a map. Decoded textures are the label they were decoded
/// under, decoded environments are `env:<label>`.
#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    reads: RefCell<Vec<String>>,
    decodes: Cell<usize>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    /// One texture file per name below `textures/<folder>/`.
    pub fn with_textures(mut self, folder: &str, names: &[&str], extension: &str) -> Self {
        for name in names {
            self.files.insert(
                format!("textures/{folder}/{name}.{extension}"),
                b"image".to_vec(),
            );
        }
        self
    }

    pub fn without_file(mut self, path: &str) -> Self {
        self.files.remove(path);
        self
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.borrow().clone()
    }

    pub fn was_read(&self, path: &str) -> bool {
        self.reads.borrow().iter().any(|p| p == path)
    }

    pub fn decodes(&self) -> usize {
        self.decodes.get()
    }
}

impl AssetLoader for MemoryLoader {
    type Texture = String;
    type Environment = String;

    async fn load_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.reads.borrow_mut().push(path.to_string());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("{path} not found"))
    }

    fn decode_texture(
        &self,
        bytes: &[u8],
        label: &str,
        _format: Option<&str>,
        _color_space: ColorSpace,
    ) -> Result<String> {
        self.decodes.set(self.decodes.get() + 1);
        if bytes == CORRUPT {
            bail!("{label} is corrupt");
        }
        Ok(label.to_string())
    }

    fn decode_environment(&self, bytes: &[u8], label: &str) -> Result<String> {
        if bytes == CORRUPT {
            bail!("{label} is corrupt");
        }
        Ok(format!("env:{label}"))
    }
}

/// Holds every read back until `gate` reads are in flight at once. A read
/// that waits too long alone fails instead.
pub struct GatedLoader {
    inner: MemoryLoader,
    gate: usize,
    started: Cell<usize>,
}

impl GatedLoader {
    const PATIENCE: usize = 1000;

    pub fn new(inner: MemoryLoader, gate: usize) -> Self {
        Self {
            inner,
            gate,
            started: Cell::new(0),
        }
    }

    pub fn started(&self) -> usize {
        self.started.get()
    }
}

async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

impl AssetLoader for GatedLoader {
    type Texture = String;
    type Environment = String;

    async fn load_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.started.set(self.started.get() + 1);
        for _ in 0..Self::PATIENCE {
            if self.started.get() >= self.gate {
                return self.inner.load_binary(path).await;
            }
            yield_now().await;
        }
        bail!("{path} was read while only {} of {} reads were in flight", self.started.get(), self.gate)
    }

    fn decode_texture(
        &self,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        color_space: ColorSpace,
    ) -> Result<String> {
        self.inner.decode_texture(bytes, label, format, color_space)
    }

    fn decode_environment(&self, bytes: &[u8], label: &str) -> Result<String> {
        self.inner.decode_environment(bytes, label)
    }
}

pub const METAL: [&str; 6] = ["ao", "color", "height", "mettalic", "normal", "roughness"];

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn extensions() -> Vec<String> {
    names(&["jpg", "png"])
}

pub const MODEL_PATH: &str = "models/car/car.glb";
pub const ENVIRONMENT_PATH: &str = "hdr/studio.hdr";

pub fn asset_config() -> AssetConfig {
    AssetConfig {
        root: "unused".to_string(),
        environment: ENVIRONMENT_PATH.to_string(),
        model: MODEL_PATH.to_string(),
        ..AssetConfig::default()
    }
}

/// A loader holding everything [`asset_config`] asks for.
pub fn complete_loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_file(ENVIRONMENT_PATH, b"radiance".to_vec())
        .with_file(MODEL_PATH, car_glb())
        .with_textures("metal", &METAL, "jpg")
}

/// Assemble a binary glTF from its JSON document and binary chunk.
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

/// One triangle, its indices and a four byte "image", laid out as in [`car_glb`].
pub fn car_bin() -> Vec<u8> {
    let mut bin = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    bin.extend_from_slice(b"png!");
    bin
}

/// A small car: a `car` group translated by (0, 1, 0) holding
///
/// - `windows`: one primitive with material `windows`
/// - `body`: two primitives with materials `carbody` and `chrome`
/// - `decal`: one primitive with the unlit material `decal`
/// - `bare`: one primitive without a material
///
/// Every primitive is the same triangle. `carbody` uses the embedded image for
/// its colour and normal textures.
pub fn car_glb() -> Vec<u8> {
    glb(CAR_JSON, &car_bin())
}

const CAR_JSON: &str = r#"{
        "asset": {"version": "2.0"},
        "extensionsUsed": ["KHR_materials_unlit"],
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "car", "translation": [0.0, 1.0, 0.0], "children": [1, 2, 3, 4]},
            {"name": "windows", "mesh": 0},
            {"name": "body", "mesh": 1},
            {"name": "decal", "mesh": 2},
            {"name": "bare", "mesh": 3}
        ],
        "meshes": [
            {"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 0}]},
            {"primitives": [
                {"attributes": {"POSITION": 0}, "indices": 1, "material": 1},
                {"attributes": {"POSITION": 0}, "indices": 1, "material": 2}
            ]},
            {"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 3}]},
            {"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}
        ],
        "materials": [
            {"name": "windows", "pbrMetallicRoughness": {"metallicFactor": 0.2, "roughnessFactor": 0.9}},
            {"name": "carbody", "pbrMetallicRoughness": {"metallicFactor": 0.5, "roughnessFactor": 0.5, "baseColorTexture": {"index": 0}}, "normalTexture": {"index": 0}},
            {"name": "chrome", "alphaMode": "BLEND", "pbrMetallicRoughness": {"baseColorFactor": [1.0, 1.0, 1.0, 0.25]}},
            {"name": "decal", "extensions": {"KHR_materials_unlit": {}}}
        ],
        "textures": [{"source": 0}],
        "images": [{"bufferView": 2, "mimeType": "image/png"}],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962},
            {"buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963},
            {"buffer": 0, "byteOffset": 44, "byteLength": 4}
        ],
        "buffers": [{"byteLength": 48}]
    }"#;

/// Like [`car_glb`] but with the binary chunk in a separate `car.bin` next to the `.gltf`.
pub fn car_gltf() -> (String, Vec<u8>) {
    let json = CAR_JSON.replace(
        r#""buffers": [{"byteLength": 48}]"#,
        r#""buffers": [{"byteLength": 48, "uri": "car.bin"}]"#,
    );
    (json, car_bin())
}

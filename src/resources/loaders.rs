//! The two [`AssetLoader`] implementations.
//!
//! [`ImageLoader`] decodes on the CPU and is usable without a GPU. [`GpuLoader`]
//! uses it for decoding and uploads the results to wgpu textures.

use std::sync::Arc;

use anyhow::*;
use image::{ImageFormat, RgbaImage, imageops, load_from_memory_with_format};

use crate::{
    config::AssetConfig,
    data_structures::{
        environment::EnvironmentMap,
        texture::{ColorSpace, Texture},
    },
    resources::{AssetLoader, load_binary},
};

#[derive(Clone, Debug)]
pub struct ImageLoader {
    root: String,
    flip_y: bool,
}

impl ImageLoader {
    pub fn new(root: impl Into<String>, flip_y: bool) -> Self {
        Self {
            root: root.into(),
            flip_y,
        }
    }

    pub fn from_config(assets: &AssetConfig) -> Self {
        Self::new(assets.root.clone(), assets.flip_y)
    }

    pub fn decode_image(&self, bytes: &[u8], format: Option<&str>) -> Result<RgbaImage> {
        let img = match format.and_then(ImageFormat::from_extension) {
            Some(fmt) => load_from_memory_with_format(bytes, fmt)?,
            None => image::load_from_memory(bytes)?,
        };
        let mut rgba = img.to_rgba8();
        if self.flip_y {
            imageops::flip_vertical_in_place(&mut rgba);
        }
        Ok(rgba)
    }
}

impl AssetLoader for ImageLoader {
    type Texture = Arc<RgbaImage>;
    type Environment = Arc<EnvironmentMap>;

    async fn load_binary(&self, path: &str) -> Result<Vec<u8>> {
        load_binary(&self.root, path).await
    }

    fn decode_texture(
        &self,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        _: ColorSpace,
    ) -> Result<Self::Texture> {
        let img = self
            .decode_image(bytes, format)
            .with_context(|| format!("could not decode texture {label}"))?;
        Ok(Arc::new(img))
    }

    fn decode_environment(&self, bytes: &[u8], label: &str) -> Result<Self::Environment> {
        let environment = EnvironmentMap::from_hdr_bytes(bytes)
            .with_context(|| format!("could not decode environment {label}"))?;
        Ok(Arc::new(environment))
    }
}

/// Decodes with an [`ImageLoader`] and uploads to the GPU.
///
/// The device and queue are internally reference counted, so this is cheap to
/// clone and can be moved onto the thread that runs the asset pipeline.
#[derive(Clone, Debug)]
pub struct GpuLoader {
    images: ImageLoader,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuLoader {
    pub fn new(images: ImageLoader, device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            images,
            device,
            queue,
        }
    }
}

impl AssetLoader for GpuLoader {
    type Texture = Arc<Texture>;
    type Environment = Arc<Texture>;

    async fn load_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.images.load_binary(path).await
    }

    fn decode_texture(
        &self,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        color_space: ColorSpace,
    ) -> Result<Self::Texture> {
        let img = self
            .images
            .decode_image(bytes, format)
            .with_context(|| format!("could not decode texture {label}"))?;
        let texture = Texture::from_image(&self.device, &self.queue, &img, Some(label), color_space)?;
        Ok(Arc::new(texture))
    }

    fn decode_environment(&self, bytes: &[u8], label: &str) -> Result<Self::Environment> {
        let environment = Arc::unwrap_or_clone(self.images.decode_environment(bytes, label)?)
            .fit_within(self.device.limits().max_texture_dimension_2d);
        let texture = Texture::from_environment(&self.device, &self.queue, &environment, label)?;
        Ok(Arc::new(texture))
    }
}

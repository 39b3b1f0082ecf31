//! Filtered environment maps.
//!
//! An [`EnvironmentMap`] is built from an equirectangular HDR panorama. Level 0
//! holds the source radiance; every further level halves both dimensions with a
//! 2x2 box filter until a single texel remains. Blurrier levels stand in for
//! rougher reflections when the map is sampled with a level of detail.

use anyhow::*;
use image::{ImageFormat, Rgb32FImage, load_from_memory_with_format};

/// One mip level of linear RGBA radiance, row major.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
}

impl EnvironmentLevel {
    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[(y * self.width + x) as usize]
    }

    /// Halves the level. Columns wrap around since the panorama is periodic in
    /// longitude, rows clamp at the poles.
    fn downsample(&self) -> EnvironmentLevel {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let x0 = (x * 2) % self.width;
                let x1 = (x * 2 + 1) % self.width;
                let y0 = (y * 2).min(self.height - 1);
                let y1 = (y * 2 + 1).min(self.height - 1);
                let samples = [
                    self.texel(x0, y0),
                    self.texel(x1, y0),
                    self.texel(x0, y1),
                    self.texel(x1, y1),
                ];
                let mut sum = [0.0f32; 4];
                for sample in samples {
                    for c in 0..4 {
                        sum[c] += sample[c];
                    }
                }
                texels.push(sum.map(|c| c * 0.25));
            }
        }
        EnvironmentLevel {
            width,
            height,
            texels,
        }
    }
}

/// Always holds at least one level.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentMap {
    levels: Vec<EnvironmentLevel>,
}

impl EnvironmentMap {
    /// Decode a Radiance `.hdr` file and filter it.
    pub fn from_hdr_bytes(bytes: &[u8]) -> Result<Self> {
        let img = load_from_memory_with_format(bytes, ImageFormat::Hdr)
            .context("could not decode HDR panorama")?;
        Self::from_equirect(&img.to_rgb32f())
    }

    pub fn from_equirect(img: &Rgb32FImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            bail!("environment panorama is empty ({width}x{height})");
        }
        let texels = img.pixels().map(|p| [p[0], p[1], p[2], 1.0]).collect();
        let mut levels = vec![EnvironmentLevel {
            width,
            height,
            texels,
        }];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Every level, finest first.
    pub fn levels(&self) -> &[EnvironmentLevel] {
        &self.levels
    }

    /// Drop the finest levels until the map is at most `max_dimension` texels
    /// on either side.
    pub fn fit_within(mut self, max_dimension: u32) -> Self {
        let keep_from = self
            .levels
            .iter()
            .position(|l| l.width <= max_dimension && l.height <= max_dimension)
            .unwrap_or(self.levels.len() - 1);
        if keep_from > 0 {
            log::warn!(
                "environment of {}x{} exceeds the texture limit of {max_dimension}, using {}x{}",
                self.width(),
                self.height(),
                self.levels[keep_from].width,
                self.levels[keep_from].height,
            );
            self.levels.drain(..keep_from);
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Radiance of the single texel of the coarsest level. Exact mean for
    /// power-of-two panoramas.
    pub fn average_radiance(&self) -> [f32; 3] {
        let last = &self.levels[self.levels.len() - 1];
        let [r, g, b, _] = last.texels[0];
        [r, g, b]
    }
}

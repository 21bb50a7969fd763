//! Template and photo loading.
//!
//! Decoding is the only suspend point before a render: callers await
//! [`decode_image`] and only install the result once it has resolved, so a
//! render never sees a half-loaded or stale image.

use std::collections::HashMap;
use std::path::PathBuf;

use image::RgbaImage;

use birthcard_common::config::TemplateConfig;
use birthcard_common::error::{BirthcardError, BirthcardResult};
use birthcard_composition_model::gender::Gender;

/// A decoded raster with non-zero natural dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    /// Wrap an already-decoded buffer, rejecting empty images.
    pub fn from_rgba(pixels: RgbaImage) -> BirthcardResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(BirthcardError::asset_load("image has zero width or height"));
        }
        Ok(Self { pixels })
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.natural_width() as f64 / self.natural_height() as f64
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) off the async executor.
pub async fn decode_image(bytes: Vec<u8>) -> BirthcardResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(BirthcardError::asset_load("image data is empty"));
    }
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| BirthcardError::asset_load(format!("decode task failed: {e}")))?
        .map_err(|e| BirthcardError::asset_load(e.to_string()))?;

    DecodedImage::from_rgba(decoded.to_rgba8())
}

/// Supplies the encoded background template for each gender.
#[async_trait::async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, gender: Gender) -> BirthcardResult<Vec<u8>>;

    /// Fetch and decode in one step.
    async fn load(&self, gender: Gender) -> BirthcardResult<DecodedImage> {
        let bytes = self.fetch(gender).await?;
        decode_image(bytes).await.map_err(|e| match e {
            BirthcardError::AssetLoadFailed { message } => {
                BirthcardError::asset_load(format!("{gender} template: {message}"))
            }
            other => other,
        })
    }
}

/// Templates stored as two files on disk.
#[derive(Debug, Clone)]
pub struct DirTemplateSource {
    boy: PathBuf,
    girl: PathBuf,
}

impl DirTemplateSource {
    pub fn new(boy: impl Into<PathBuf>, girl: impl Into<PathBuf>) -> Self {
        Self {
            boy: boy.into(),
            girl: girl.into(),
        }
    }

    pub fn from_config(config: &TemplateConfig) -> Self {
        Self::new(config.boy.clone(), config.girl.clone())
    }

    pub fn path_for(&self, gender: Gender) -> &PathBuf {
        match gender {
            Gender::Boy => &self.boy,
            Gender::Girl => &self.girl,
        }
    }
}

#[async_trait::async_trait]
impl TemplateSource for DirTemplateSource {
    async fn fetch(&self, gender: Gender) -> BirthcardResult<Vec<u8>> {
        let path = self.path_for(gender);
        tokio::fs::read(path).await.map_err(|e| {
            BirthcardError::asset_load(format!("cannot read {}: {e}", path.display()))
        })
    }
}

/// Templates held in memory, keyed by gender.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    assets: HashMap<Gender, Vec<u8>>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gender: Gender, bytes: Vec<u8>) -> Self {
        self.assets.insert(gender, bytes);
        self
    }
}

#[async_trait::async_trait]
impl TemplateSource for InMemoryTemplates {
    async fn fetch(&self, gender: Gender) -> BirthcardResult<Vec<u8>> {
        self.assets
            .get(&gender)
            .cloned()
            .ok_or_else(|| BirthcardError::asset_load(format!("no {gender} template")))
    }
}

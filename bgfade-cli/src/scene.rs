// ABOUTME: Scene files describing one background: its images, loading flags and host events
// ABOUTME: Parses JSON or TOML scenes and validates the embedded image descriptors

use anyhow::{Context, Result};
use bgfade::{DescriptorSet, ImageKind, ImageSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default)]
    pub kind: ImageKind,
    #[serde(default)]
    pub images: Option<DescriptorSet>,
    /// Load immediately instead of waiting for visibility
    #[serde(default)]
    pub critical: bool,
    /// Already in view when mounted
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

/// Host notification replayed against the background.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneEvent {
    /// Scrolled into view; images are activated
    Show,
    Hide,
    Load(LoadEvent),
    /// Every pending image fails
    Error,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoadEvent {
    /// Layer whose image finished; every image when absent
    #[serde(default)]
    pub layer: Option<usize>,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    /// Source the host picked among the candidates
    #[serde(default)]
    pub current_src: Option<String>,
}

fn default_dimension() -> u32 {
    1
}

impl fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneEvent::Show => write!(f, "show"),
            SceneEvent::Hide => write!(f, "hide"),
            SceneEvent::Error => write!(f, "error"),
            SceneEvent::Load(load) => {
                match load.layer {
                    Some(layer) => write!(f, "load #{}", layer)?,
                    None => write!(f, "load")?,
                }
                write!(f, " {}x{}", load.width, load.height)
            }
        }
    }
}

impl Scene {
    /// Parses by extension: `.json` as JSON, anything else as TOML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let scene = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        scene.with_context(|| format!("Invalid scene file: {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(content)
            .map_err(bgfade::Error::from)
            .context("Failed to parse JSON scene")?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(content).context("Failed to parse TOML scene")?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(images) = &self.images {
            images.validate()?;
        }
        Ok(())
    }

    /// Image input compared when switching scenes.
    pub fn image_source(&self) -> Option<ImageSource> {
        self.images.clone().map(|images| ImageSource {
            kind: self.kind,
            images,
        })
    }
}

// ABOUTME: Image descriptor data model for single and layered backgrounds
// ABOUTME: Tagged unions replace runtime shape checks so every operation matches on the mode

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// One loadable image variant together with its placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    #[builder(default, setter(into))]
    #[serde(default)]
    pub src: String,

    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,

    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set_webp: Option<String>,

    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,

    /// Inline low-resolution preview, already a data URI
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,

    /// Vector trace placeholder; wins over `base64`
    #[builder(default, setter(strip_option, into))]
    #[serde(default, rename = "tracedSVG", skip_serializing_if = "Option::is_none")]
    pub traced_svg: Option<String>,

    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
}

impl ImageDescriptor {
    pub fn has_traced_svg(&self) -> bool {
        self.traced_svg.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_base64(&self) -> bool {
        self.base64.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// One entry in a layered background stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageLayer {
    /// Bare CSS literal such as `rgba(0,0,0,0.5)` or a gradient
    Css(String),
    Image(ImageDescriptor),
}

impl ImageLayer {
    pub fn descriptor(&self) -> Option<&ImageDescriptor> {
        match self {
            ImageLayer::Image(descriptor) => Some(descriptor),
            ImageLayer::Css(_) => None,
        }
    }

    /// Final source of an image layer; CSS layers have none.
    pub fn src(&self) -> Option<&str> {
        self.descriptor().map(|d| d.src.as_str())
    }
}

impl From<ImageDescriptor> for ImageLayer {
    fn from(descriptor: ImageDescriptor) -> Self {
        ImageLayer::Image(descriptor)
    }
}

impl From<&str> for ImageLayer {
    fn from(css: &str) -> Self {
        ImageLayer::Css(css.to_string())
    }
}

/// Either one background image or an ordered stack of layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorSet {
    Layered(Vec<ImageLayer>),
    Single(ImageDescriptor),
}

impl DescriptorSet {
    pub fn layered<I, L>(layers: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<ImageLayer>,
    {
        DescriptorSet::Layered(layers.into_iter().map(Into::into).collect())
    }

    pub fn is_layered(&self) -> bool {
        matches!(self, DescriptorSet::Layered(_))
    }

    /// Number of CSS layers this set produces.
    pub fn len(&self) -> usize {
        match self {
            DescriptorSet::Single(_) => 1,
            DescriptorSet::Layered(layers) => layers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let set: DescriptorSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<()> {
        if let DescriptorSet::Layered(layers) = self {
            if layers.is_empty() {
                return Err(Error::InvalidDescriptor(
                    "layered background has no layers".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl From<ImageDescriptor> for DescriptorSet {
    fn from(descriptor: ImageDescriptor) -> Self {
        DescriptorSet::Single(descriptor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Scales with its container
    #[default]
    Fluid,
    /// Fixed pixel dimensions
    Fixed,
}

/// The image input of one background: its kind plus the descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(default)]
    pub kind: ImageKind,
    pub images: DescriptorSet,
}

impl ImageSource {
    pub fn fluid(images: impl Into<DescriptorSet>) -> Self {
        Self {
            kind: ImageKind::Fluid,
            images: images.into(),
        }
    }

    pub fn fixed(images: impl Into<DescriptorSet>) -> Self {
        Self {
            kind: ImageKind::Fixed,
            images: images.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let source: ImageSource = serde_json::from_str(json)?;
        source.images.validate()?;
        Ok(source)
    }
}

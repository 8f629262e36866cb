// ABOUTME: Background value state machine choosing between placeholders and loaded images
// ABOUTME: Composes single values or positionally aligned layer stacks for CSS backgrounds

use crate::constants::css;
use crate::descriptor::{DescriptorSet, ImageDescriptor, ImageLayer};
use crate::extract::{extract_field, extract_layers, ImageField};
use crate::format::{format_value, join_non_empty, FormatOptions};
use crate::reference::{ImageReference, ReferenceSet};
use serde::{Deserialize, Serialize};

/// Load progress of the background owning the images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadPhase {
    pub has_loaded: bool,
    /// Eligible to load and show, e.g. scrolled into view or critical
    pub is_visible: bool,
    /// Incremented per load; its parity drives the cross-fade layer
    pub image_state: u32,
}

impl LoadPhase {
    pub fn show_loaded(&self) -> bool {
        self.has_loaded && self.is_visible
    }

    pub fn after_opacity(&self) -> u8 {
        (self.image_state % 2) as u8
    }
}

/// A `background-image` value, either one image or one entry per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundValue {
    Single(String),
    Layered(Vec<String>),
}

impl Default for BackgroundValue {
    fn default() -> Self {
        BackgroundValue::Single(String::new())
    }
}

impl BackgroundValue {
    /// CSS text of the value, layers separated by commas.
    pub fn css(&self) -> String {
        match self {
            BackgroundValue::Single(value) => value.clone(),
            BackgroundValue::Layered(layers) => {
                join_non_empty(layers.as_slice(), css::LAYER_SEPARATOR)
            }
        }
    }

    pub fn layers(&self) -> Option<&[String]> {
        match self {
            BackgroundValue::Single(_) => None,
            BackgroundValue::Layered(layers) => Some(layers),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BackgroundValue::Single(value) => value.is_empty(),
            BackgroundValue::Layered(layers) => layers.iter().all(String::is_empty),
        }
    }

    /// Per-position values used to back-fill a layer stack.
    fn fill_values(&self) -> Vec<String> {
        match self {
            BackgroundValue::Single(value) if value.is_empty() => Vec::new(),
            BackgroundValue::Single(value) => vec![value.clone()],
            BackgroundValue::Layered(layers) => layers.clone(),
        }
    }
}

impl From<&str> for BackgroundValue {
    fn from(value: &str) -> Self {
        BackgroundValue::Single(value.to_string())
    }
}

impl From<String> for BackgroundValue {
    fn from(value: String) -> Self {
        BackgroundValue::Single(value)
    }
}

impl From<Vec<String>> for BackgroundValue {
    fn from(layers: Vec<String>) -> Self {
        BackgroundValue::Layered(layers)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub image: &'a DescriptorSet,
    /// Value currently shown
    pub background: &'a BackgroundValue,
    pub reference: Option<&'a ReferenceSet>,
    pub phase: LoadPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionResult {
    pub previous_value: String,
    pub next_value: BackgroundValue,
    pub after_opacity: u8,
}

impl CompositionResult {
    pub fn next_css(&self) -> String {
        self.next_value.css()
    }

    pub fn next_layers(&self) -> Option<&[String]> {
        self.next_value.layers()
    }
}

/// Computes the next background value from descriptors, image references and load phase.
pub fn switch_image_settings(input: ComposeInput<'_>) -> CompositionResult {
    let previous_value = input.background.css();

    let next_value = match input.image {
        DescriptorSet::Layered(layers) => BackgroundValue::Layered(compose_layers(
            layers,
            input.background,
            input.reference,
            input.phase,
        )),
        DescriptorSet::Single(descriptor) => {
            let reference = input.reference.and_then(ReferenceSet::as_single);
            let mut next = compose_single(descriptor, reference, input.phase);
            if next.is_empty() {
                next.clone_from(&previous_value);
            }
            BackgroundValue::Single(next)
        }
    };

    CompositionResult {
        previous_value,
        next_value,
        after_opacity: input.phase.after_opacity(),
    }
}

/// First-paint value from placeholders only.
pub fn initial_background(images: Option<&DescriptorSet>, with_padding: bool) -> BackgroundValue {
    match images {
        None => BackgroundValue::default(),
        Some(DescriptorSet::Single(descriptor)) => {
            BackgroundValue::Single(placeholder_single(descriptor))
        }
        Some(DescriptorSet::Layered(layers)) => {
            let mut composed = placeholder_layers(layers);
            if with_padding {
                fill_empty(&mut composed, &dummy_layers(layers.len()));
            }
            BackgroundValue::Layered(composed)
        }
    }
}

/// One transparent pixel per layer.
pub fn dummy_layers(len: usize) -> Vec<String> {
    vec![format_value(css::DUMMY_IMAGE, FormatOptions::default()); len]
}

fn placeholder_single(descriptor: &ImageDescriptor) -> String {
    let field = if descriptor.has_traced_svg() {
        ImageField::TracedSvg
    } else if descriptor.has_base64() {
        ImageField::Base64
    } else {
        return String::new();
    };
    extract_field(Some(descriptor), Some(field), FormatOptions::default()).into_string()
}

fn compose_single(
    descriptor: &ImageDescriptor,
    reference: Option<&ImageReference>,
    phase: LoadPhase,
) -> String {
    if !phase.show_loaded() {
        return placeholder_single(descriptor);
    }

    let options = FormatOptions::default();
    let mut next = extract_field(reference, Some(ImageField::CurrentSrc), options).into_string();
    if next.is_empty() {
        next = extract_field(reference, Some(ImageField::Src), options).into_string();
    }
    if next.is_empty() {
        next = extract_field(Some(descriptor), Some(ImageField::Src), options).into_string();
    }
    next
}

fn placeholder_layers(layers: &[ImageLayer]) -> Vec<String> {
    let options = FormatOptions::default().as_array();
    let extract = |field: ImageField, options: FormatOptions| {
        extract_layers(Some(layers), Some(field), options).into_layers()
    };

    let mut composed = extract(ImageField::TracedSvg, options);
    fill_empty(&mut composed, &extract(ImageField::Base64, options));
    overlay(&mut composed, &extract(ImageField::CssString, options.without_url()));
    composed
}

fn compose_layers(
    layers: &[ImageLayer],
    background: &BackgroundValue,
    reference: Option<&ReferenceSet>,
    phase: LoadPhase,
) -> Vec<String> {
    let mut composed = placeholder_layers(layers);

    if phase.show_loaded() {
        overlay(&mut composed, &loaded_layers(reference));
    }

    // Keep each layer's last good value across partial reloads
    fill_empty(&mut composed, &background.fill_values());
    fill_empty(&mut composed, &dummy_layers(layers.len()));
    composed
}

fn loaded_layers(reference: Option<&ReferenceSet>) -> Vec<String> {
    let Some(references) = reference.and_then(ReferenceSet::as_layered) else {
        return Vec::new();
    };

    let options = FormatOptions::default().as_array();
    let resolved =
        extract_layers(Some(references), Some(ImageField::CurrentSrc), options).into_layers();
    if resolved.iter().any(|value| !value.is_empty()) {
        resolved
    } else {
        extract_layers(Some(references), Some(ImageField::Src), options).into_layers()
    }
}

/// Non-empty values of `top` replace the matching positions of `base`.
fn overlay(base: &mut [String], top: &[String]) {
    for (slot, value) in base.iter_mut().zip(top) {
        if !value.is_empty() {
            slot.clone_from(value);
        }
    }
}

/// Empty positions of `base` take the matching value of `fallback`.
fn fill_empty(base: &mut [String], fallback: &[String]) {
    for (slot, value) in base.iter_mut().zip(fallback) {
        if slot.is_empty() {
            slot.clone_from(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_overlay_and_fill() {
        let mut base = s(&["a", "", "c"]);
        overlay(&mut base, &s(&["", "B"]));
        assert_eq!(base, s(&["a", "B", "c"]));

        let mut base = s(&["a", "", ""]);
        fill_empty(&mut base, &s(&["x", "y"]));
        assert_eq!(base, s(&["a", "y", ""]));
    }

    #[test]
    fn test_background_value_css() {
        assert_eq!(BackgroundValue::from("url(a)").css(), "url(a)");
        assert_eq!(
            BackgroundValue::from(s(&["url(a)", "", "url(b)"])).css(),
            "url(a), url(b)"
        );
        assert!(BackgroundValue::default().is_empty());
        assert!(BackgroundValue::from("x").layers().is_none());
    }

    #[test]
    fn test_after_opacity_parity() {
        let phase = LoadPhase {
            image_state: 3,
            ..Default::default()
        };
        assert_eq!(phase.after_opacity(), 1);
        let phase = LoadPhase {
            image_state: 4,
            ..Default::default()
        };
        assert_eq!(phase.after_opacity(), 0);
    }

    #[test]
    fn test_dummy_layers() {
        let dummies = dummy_layers(2);
        assert_eq!(dummies.len(), 2);
        assert_eq!(dummies[0], format!("url({})", css::DUMMY_IMAGE));
        assert!(dummy_layers(0).is_empty());
    }

    #[test]
    fn test_initial_background_without_images() {
        assert_eq!(initial_background(None, true), BackgroundValue::default());
    }
}

// ABOUTME: Progressive background-image engine: placeholders first, loaded images later
// ABOUTME: Exposes the seen-image cache, load references, value composer and change detector

//! Composition core for progressively loaded CSS backgrounds.
//!
//! A host hands in [`DescriptorSet`]s, creates image references with
//! [`create_reference`], reports load completion through
//! [`ImageReference::finish_load`] and asks [`switch_image_settings`] which
//! `background-image` value to show next. Images seen loaded are recorded in an
//! [`ImageCache`] so later mounts can skip the fade.

pub mod cache;
pub mod change;
pub mod compose;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod format;
pub mod reference;

pub use cache::{shared_cache, ImageCache};
pub use change::{has_changed, layered_changed};
pub use compose::{
    dummy_layers, initial_background, switch_image_settings, BackgroundValue, ComposeInput,
    CompositionResult, LoadPhase,
};
pub use descriptor::{DescriptorSet, ImageDescriptor, ImageKind, ImageLayer, ImageSource};
pub use error::{Error, Result};
pub use extract::{extract_field, extract_layers, FieldSource, ImageField};
pub use format::{format_value, format_values, FormatOptions, FormattedValue};
pub use reference::{
    activate_reference, create_reference, image_loaded, reference_completed, Callback,
    Environment, ImageReference, LoadOptions, Picture, PictureSource, ReferenceSet,
};

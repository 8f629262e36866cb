// ABOUTME: Decides whether new image input requires restarting the load cycle
// ABOUTME: Compares kinds, single/layered shape, layer counts and image sources

use crate::descriptor::{DescriptorSet, ImageLayer, ImageSource};

/// True when `next` needs a fresh load cycle compared to `prev`.
pub fn has_changed(prev: Option<&ImageSource>, next: Option<&ImageSource>) -> bool {
    match (prev, next) {
        (None, None) => false,
        (None, Some(_)) | (Some(_), None) => true,
        (Some(prev), Some(next)) => {
            if prev.kind != next.kind {
                return true;
            }
            match (&prev.images, &next.images) {
                (DescriptorSet::Single(prev), DescriptorSet::Single(next)) => prev.src != next.src,
                (DescriptorSet::Layered(prev), DescriptorSet::Layered(next)) => {
                    layered_changed(prev, next)
                }
                _ => true,
            }
        }
    }
}

/// Compares two layer stacks.
///
/// Equal-length stacks only count as changed when every position's source
/// differs, so replacing a single layer of several is not detected.
pub fn layered_changed(prev: &[ImageLayer], next: &[ImageLayer]) -> bool {
    if prev.len() != next.len() {
        return true;
    }
    next.iter()
        .zip(prev)
        .all(|(next, prev)| next.src() != prev.src())
}

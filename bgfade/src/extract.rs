// ABOUTME: Pulls named fields out of descriptors, layers and load references
// ABOUTME: Applies per-field rules before handing values to the CSS value formatter

use crate::descriptor::{ImageDescriptor, ImageLayer};
use crate::format::{format_value, format_values, FormatOptions, FormattedValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageField {
    Src,
    SrcSet,
    SrcSetWebp,
    Sizes,
    Base64,
    TracedSvg,
    /// Bare CSS literal layer, used without `url()`
    CssString,
    /// Source the host actually picked, only meaningful once loaded
    CurrentSrc,
}

/// Anything a field can be extracted from.
pub trait FieldSource {
    /// Raw value of `field`, `None` when the source does not carry it.
    fn field_value(&self, field: ImageField) -> Option<String>;

    /// Whether a load finished with real pixels. Gates `CurrentSrc`.
    fn load_completed(&self) -> bool {
        false
    }
}

impl FieldSource for ImageDescriptor {
    fn field_value(&self, field: ImageField) -> Option<String> {
        match field {
            ImageField::Src => Some(self.src.clone()),
            ImageField::SrcSet => self.src_set.clone(),
            ImageField::SrcSetWebp => self.src_set_webp.clone(),
            ImageField::Sizes => self.sizes.clone(),
            ImageField::Base64 => self.base64.clone(),
            ImageField::TracedSvg => self.traced_svg.clone(),
            ImageField::CssString | ImageField::CurrentSrc => None,
        }
    }
}

impl FieldSource for ImageLayer {
    fn field_value(&self, field: ImageField) -> Option<String> {
        match (self, field) {
            (ImageLayer::Css(css), ImageField::CssString) => Some(css.clone()),
            (ImageLayer::Css(_), _) => None,
            (ImageLayer::Image(descriptor), field) => descriptor.field_value(field),
        }
    }
}

fn raw_value<T: FieldSource>(source: &T, field: ImageField) -> String {
    if field == ImageField::CurrentSrc && !source.load_completed() {
        return String::new();
    }
    source.field_value(field).unwrap_or_default()
}

fn field_options(field: ImageField, options: FormatOptions) -> FormatOptions {
    options.traced_svg(field == ImageField::TracedSvg)
}

/// Extracts `field` from a single source.
pub fn extract_field<T: FieldSource>(
    source: Option<&T>,
    field: Option<ImageField>,
    options: FormatOptions,
) -> FormattedValue {
    let (Some(source), Some(field)) = (source, field) else {
        return FormattedValue::Joined(String::new());
    };

    let value = raw_value(source, field);
    FormattedValue::Joined(format_value(&value, field_options(field, options)))
}

/// Extracts `field` from every element of a layer stack, keeping positions.
pub fn extract_layers<T: FieldSource>(
    sources: Option<&[T]>,
    field: Option<ImageField>,
    options: FormatOptions,
) -> FormattedValue {
    let (Some(sources), Some(field)) = (sources, field) else {
        return FormattedValue::Joined(String::new());
    };

    let values: Vec<String> = sources
        .iter()
        .map(|source| raw_value(source, field))
        .collect();
    format_values(values.as_slice(), field_options(field, options))
}

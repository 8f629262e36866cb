// ABOUTME: Converts raw image fields into CSS-ready background values
// ABOUTME: Handles url() wrapping, quoting of network URLs and traced SVG literals

use crate::constants::css;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Value is a traced SVG and gets double-quoted
    pub traced_svg: bool,
    /// Wrap non-empty values in `url(...)`
    pub add_url: bool,
    /// Keep list input as a list instead of joining it
    pub as_array: bool,
    /// Single-quote every value, not just network URLs
    pub force_quoted_url: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            traced_svg: false,
            add_url: true,
            as_array: false,
            force_quoted_url: false,
        }
    }
}

impl FormatOptions {
    pub fn traced_svg(mut self, traced_svg: bool) -> Self {
        self.traced_svg = traced_svg;
        self
    }

    pub fn without_url(mut self) -> Self {
        self.add_url = false;
        self
    }

    pub fn as_array(mut self) -> Self {
        self.as_array = true;
        self
    }

    pub fn force_quoted_url(mut self) -> Self {
        self.force_quoted_url = true;
        self
    }
}

/// Either a flattened string or one value per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedValue {
    Joined(String),
    Layers(Vec<String>),
}

impl FormattedValue {
    pub fn into_string(self) -> String {
        match self {
            FormattedValue::Joined(value) => value,
            FormattedValue::Layers(values) => {
                join_non_empty(values.as_slice(), css::VALUE_SEPARATOR)
            }
        }
    }

    pub fn into_layers(self) -> Vec<String> {
        match self {
            FormattedValue::Joined(value) if value.is_empty() => Vec::new(),
            FormattedValue::Joined(value) => vec![value],
            FormattedValue::Layers(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FormattedValue::Joined(value) => value.is_empty(),
            FormattedValue::Layers(values) => values.iter().all(String::is_empty),
        }
    }
}

pub fn format_value(value: &str, options: FormatOptions) -> String {
    if value.is_empty() {
        return String::new();
    }

    let quoted = if options.traced_svg {
        format!("\"{}\"", value)
    } else if !value.contains(css::BASE64_MARKER)
        && (options.force_quoted_url || is_network_url(value))
    {
        format!("'{}'", value)
    } else {
        value.to_string()
    };

    if options.add_url {
        format!("url({})", quoted)
    } else {
        quoted
    }
}

pub fn format_values<S: AsRef<str>>(values: &[S], options: FormatOptions) -> FormattedValue {
    let formatted: Vec<String> = values
        .iter()
        .map(|value| format_value(value.as_ref(), options))
        .collect();

    if options.as_array {
        FormattedValue::Layers(formatted)
    } else {
        FormattedValue::Joined(join_non_empty(formatted.as_slice(), css::VALUE_SEPARATOR))
    }
}

pub fn join_non_empty<S: AsRef<str>>(values: &[S], separator: &str) -> String {
    values
        .iter()
        .map(|value| value.as_ref())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Absolute `http`/`https` reference, judged by scheme prefix alone.
fn is_network_url(value: &str) -> bool {
    css::NETWORK_SCHEMES.iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

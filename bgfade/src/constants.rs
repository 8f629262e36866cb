// ABOUTME: Centralized constants for background value composition
// ABOUTME: Contains the dummy layer pixel, CSS separators and source MIME types

/// CSS value formatting
pub mod css {
    /// Transparent 1x1 GIF used to keep layered backgrounds positionally aligned
    pub const DUMMY_IMAGE: &str =
        "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

    /// Separator between `background-image` layers
    pub const LAYER_SEPARATOR: &str = ", ";

    /// Separator used when a formatted list is flattened to a single string
    pub const VALUE_SEPARATOR: &str = " ";

    /// Marker identifying an embedded preview payload
    pub const BASE64_MARKER: &str = "base64";

    /// Scheme prefixes of absolute network references, matched case-insensitively
    pub const NETWORK_SCHEMES: [&str; 2] = ["http://", "https://"];
}

/// Picture source types
pub mod mime {
    pub const WEBP: &str = "image/webp";
}

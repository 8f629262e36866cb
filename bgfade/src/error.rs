// ABOUTME: Error types for loading image descriptor data into the composition engine
// ABOUTME: Composition itself never fails; only parsing and validation of input data can

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid image descriptor: {0}")]
    InvalidDescriptor(String),
}

impl Error {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            Error::Json(_) => {
                Some("Images must be a `src` object, or an array of such objects and CSS strings")
            }
            Error::InvalidDescriptor(_) => {
                Some("Layered backgrounds need at least one image or CSS layer")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

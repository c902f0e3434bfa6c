//! Annotation Layer
//!
//! Session state, per-class thresholds and overlay rendering for the image
//! on screen. All mutation goes through [`Annotator`]; the renderer and the
//! slider panel only read from it.

pub mod canvas;
pub mod controller;
pub mod palette;
pub mod render;
pub mod session;
pub mod threshold;

pub use controller::{Annotator, BatchGrid};

use thiserror::Error;

/// A user action that could not start
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Please upload an image first.")]
    NoImage,

    #[error("No text regions detected to extract from.")]
    NoTextRegions,

    #[error("{0} is already running")]
    Busy(&'static str),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

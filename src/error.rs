use thiserror::Error;

/// Errors surfaced by canvas operations.
///
/// Interactive stroke input never produces these; invalid stroke state is a
/// boolean no-op instead. Index-based layer edits and registry lookups return
/// them so library callers can decide how to react.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("layer index {0} is out of range")]
    LayerOutOfRange(usize),

    #[error("no brush registered under name {0:?}")]
    UnknownBrush(String),

    #[error("no texture registered under name {0:?}")]
    UnknownTexture(String),

    #[error("failed to decode texture image: {0}")]
    TextureDecode(#[from] image::ImageError),

    #[error("failed to decode canvas snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#![warn(clippy::all, rust_2018_idioms)]

//! A drawing-surface core: pointer input becomes pressure-width quad ribbons,
//! grouped into strokes and layers, with every mutation reversible through a
//! command history. GPU presentation, input dispatch, and persistence codecs
//! stay behind small collaborator traits so the whole engine runs headless.

pub mod brush;
pub mod canvas;
pub mod command;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod persistence;
pub mod render;
pub mod stroke;
pub mod texture;
pub mod tool;

pub use brush::{Brush, PipelineKind};
pub use canvas::{Canvas, SceneGraph};
pub use command::{Command, CommandHistory};
pub use error::CanvasError;
pub use event::{CanvasListener, LayerChange};
pub use geometry::{PendingQuad, Quad, Vertex};
pub use input::{InputEvent, InputSample, PointerKind};
pub use layer::Layer;
pub use persistence::CanvasSnapshot;
pub use render::{
    GeometryBatch, GeometryCapture, NullRenderTarget, NullTextureLoader, RenderTarget,
    TextureLoader, batch_to_mesh,
};
pub use stroke::Stroke;
pub use texture::TextureManager;
pub use tool::ToolKind;

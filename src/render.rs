use egui::epaint::Mesh;
use egui::{ColorImage, TextureId};

use crate::brush::PipelineKind;
use crate::geometry::Vertex;

/// The one capability the canvas needs from a presentation backend: accept a
/// batch of triangle-list vertices under a pipeline/texture state.
///
/// Composition calls this once per stroke, back to front. Implementations
/// must not assume anything else about frame pacing; the canvas may be
/// rendered repeatedly without intervening mutations.
pub trait RenderTarget {
    fn submit(&mut self, vertices: &[Vertex], pipeline: PipelineKind, texture: Option<TextureId>);
}

/// Discards all geometry. Lets the canvas run headless, e.g. in tests.
pub struct NullRenderTarget;

impl RenderTarget for NullRenderTarget {
    fn submit(&mut self, _vertices: &[Vertex], _pipeline: PipelineKind, _texture: Option<TextureId>) {}
}

/// One submitted draw batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBatch {
    pub vertices: Vec<Vertex>,
    pub pipeline: PipelineKind,
    pub texture: Option<TextureId>,
}

/// Records every submitted batch in order. Useful for inspecting composition
/// output and for driving backends that want whole-frame geometry at once.
#[derive(Debug, Default)]
pub struct GeometryCapture {
    pub batches: Vec<GeometryBatch>,
}

impl GeometryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

impl RenderTarget for GeometryCapture {
    fn submit(&mut self, vertices: &[Vertex], pipeline: PipelineKind, texture: Option<TextureId>) {
        self.batches.push(GeometryBatch {
            vertices: vertices.to_vec(),
            pipeline,
            texture,
        });
    }
}

/// Converts a captured batch into an egui mesh for painter-based backends.
/// Vertex rotation is already baked into the corner positions, so only
/// position and color survive the conversion.
pub fn batch_to_mesh(batch: &GeometryBatch) -> Mesh {
    let mut mesh = Mesh::with_texture(batch.texture.unwrap_or_default());
    for vertex in &batch.vertices {
        mesh.colored_vertex(vertex.position, vertex.color);
    }
    mesh.indices = (0..batch.vertices.len() as u32).collect();
    mesh
}

/// Uploads decoded texture images to the presentation backend, returning the
/// opaque handle strokes are keyed by at submit time.
pub trait TextureLoader {
    fn load_texture(&mut self, name: &str, image: &ColorImage) -> TextureId;
}

/// Hands out sequential user-space texture ids without uploading anything.
/// Pairs with [`NullRenderTarget`] for headless use.
#[derive(Debug, Default)]
pub struct NullTextureLoader {
    next: u64,
}

impl TextureLoader for NullTextureLoader {
    fn load_texture(&mut self, _name: &str, _image: &ColorImage) -> TextureId {
        let id = TextureId::User(self.next);
        self.next += 1;
        id
    }
}

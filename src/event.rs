use crate::tool::ToolKind;

/// Structural change to the layer stack, reported through
/// [`CanvasListener::layer_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChange {
    Added { index: usize },
    Removed { index: usize },
    Moved { from: usize, to: usize },
    LockChanged { index: usize, locked: bool },
    VisibilityChanged { index: usize, hidden: bool },
    Selected { index: Option<usize> },
}

/// Observer for canvas state changes.
///
/// The canvas holds at most one listener and invokes it synchronously after
/// the corresponding mutation has committed. All methods default to no-ops so
/// implementors only override the events they care about.
pub trait CanvasListener {
    fn tool_changed(&mut self, _tool: ToolKind) {}

    fn brush_changed(&mut self, _name: &str) {}

    /// A finished stroke was appended to the layer at `_layer`.
    fn stroke_committed(&mut self, _layer: usize) {}

    fn layer_changed(&mut self, _change: LayerChange) {}

    /// A layer (`Some(index)`) or the whole canvas (`None`) was cleared.
    fn cleared(&mut self, _layer: Option<usize>) {}

    fn undo_performed(&mut self) {}

    fn redo_performed(&mut self) {}
}

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::brush::Brush;
use crate::geometry::{PendingQuad, Quad, Vertex};

/// One continuous pointer-down-to-pointer-up drawing action: an ordered
/// sequence of closed quads sharing one brush, plus the open quad currently
/// being extended.
///
/// Consecutive quads share an edge (each quad's leading corners equal the
/// previous quad's trailing corners), so the ribbon renders without seams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    brush: Brush,
    quads: Vec<Quad>,
    /// The quad opened by the most recent sample, closed by the next one.
    /// Cleared when the stroke is finished or cancelled.
    #[serde(skip)]
    pending: Option<PendingQuad>,
}

impl Stroke {
    /// An empty, inactive stroke.
    pub fn new(brush: Brush) -> Self {
        Self {
            brush,
            quads: Vec::new(),
            pending: None,
        }
    }

    /// Starts a stroke at `start`, opening its first quad.
    pub fn begin(brush: Brush, start: Pos2, force: f32) -> Self {
        Self {
            brush,
            quads: Vec::new(),
            pending: Some(PendingQuad::new(start, force)),
        }
    }

    /// Rebuilds a stroke from already-closed quads, e.g. when decoding a
    /// persisted scene.
    pub(crate) fn from_quads(brush: Brush, quads: Vec<Quad>) -> Self {
        Self {
            brush,
            quads,
            pending: None,
        }
    }

    /// Closes the open quad at `point` and opens the next one there,
    /// carrying `force` forward as its start pressure.
    ///
    /// Returns `false` without touching the stroke when no quad is open
    /// (the stroke was never begun, or has been finished).
    pub fn append(&mut self, point: Pos2, force: f32) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let quad = pending.close(point, force, &self.brush, self.quads.last());
        self.quads.push(quad);
        self.pending = Some(PendingQuad::new(point, force));
        true
    }

    /// Discards closed quads and retessellates the whole stroke along
    /// `points` at a uniform pressure. Shape tools rebuild their outline
    /// this way on every pointer move.
    pub(crate) fn retessellate(&mut self, points: &[Pos2], force: f32) {
        self.quads.clear();
        self.pending = None;

        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pending = PendingQuad::new(*first, force);
        for point in rest {
            let quad = pending.close(*point, force, &self.brush, self.quads.last());
            self.quads.push(quad);
            pending = PendingQuad::new(*point, force);
        }
    }

    /// Freezes the stroke: drops the open quad so no more samples can extend
    /// it. The closed quads stay as they are.
    pub fn finish(&mut self) {
        self.pending = None;
    }

    /// A stroke with no closed quads leaves no visible mark and is never
    /// committed to a layer.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    #[cfg(test)]
    pub(crate) fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }

    /// Flattened triangle-list geometry for the whole stroke.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.quads.iter().flat_map(|q| q.vertices()).collect()
    }
}

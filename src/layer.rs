use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stroke::Stroke;

/// An ordered container of committed strokes.
///
/// Stroke order is insertion order and is what the compositor draws, so later
/// strokes paint over earlier ones. A locked layer rejects interactive stroke
/// appends; history replay goes through [`Layer::strokes_mut`] instead because
/// its entries were legal when they were recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable identity, independent of the layer's position in the stack.
    pub id: Uuid,
    pub name: String,
    strokes: Vec<Stroke>,
    /// Hidden layers keep their strokes but are skipped during composition.
    pub hidden: bool,
    pub locked: bool,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            strokes: Vec::new(),
            hidden: false,
            locked: false,
        }
    }

    pub(crate) fn with_strokes(name: &str, strokes: Vec<Stroke>) -> Self {
        Self {
            strokes,
            ..Self::new(name)
        }
    }

    /// Appends a stroke. Returns `false` (leaving the layer untouched) when
    /// the layer is locked.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        if self.locked {
            return false;
        }
        self.strokes.push(stroke);
        true
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Unguarded access for command replay and persistence.
    pub(crate) fn strokes_mut(&mut self) -> &mut Vec<Stroke> {
        &mut self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

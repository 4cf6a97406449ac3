use serde::{Deserialize, Serialize};

use crate::canvas::SceneGraph;
use crate::layer::Layer;
use crate::stroke::Stroke;

/// A reversible mutation of the scene graph.
///
/// Every variant owns a deep copy of the data its replay needs, taken at
/// record time. Mutating the live scene after recording therefore never
/// changes what undo or redo will do later, and a history log can be
/// serialized and inspected as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// A finished stroke was appended to `layer`.
    AddStroke { layer: usize, stroke: Stroke },

    /// `layer` was inserted at `index`. The layer snapshot keeps its id, so
    /// undoing and redoing an insertion restores the same layer identity.
    AddLayer {
        index: usize,
        layer: Layer,
        previous_current: Option<usize>,
        new_current: Option<usize>,
    },

    /// `layer` was removed from `index`.
    RemoveLayer {
        index: usize,
        layer: Layer,
        previous_current: Option<usize>,
        new_current: Option<usize>,
    },

    /// The layer at `from` moved to `to`.
    MoveLayer { from: usize, to: usize },

    /// The lock flag of the layer at `index` changed to `locked`.
    SetLayerLocked { index: usize, locked: bool },

    /// The layer at `index` was cleared of `strokes`.
    ClearLayer { index: usize, strokes: Vec<Stroke> },

    /// Every layer was cleared; one stroke snapshot per layer, in stack
    /// order.
    ClearAll { snapshots: Vec<Vec<Stroke>> },
}

impl Command {
    /// Reverts the mutation this command records.
    pub fn undo(&self, scene: &mut SceneGraph) {
        match self {
            Command::AddStroke { layer, .. } => {
                if let Some(layer) = scene.layers.get_mut(*layer) {
                    layer.strokes_mut().pop();
                }
            }

            Command::AddLayer {
                index,
                previous_current,
                ..
            } => {
                if *index < scene.layers.len() {
                    scene.layers.remove(*index);
                }
                scene.current = *previous_current;
            }

            Command::RemoveLayer {
                index,
                layer,
                previous_current,
                ..
            } => {
                let index = (*index).min(scene.layers.len());
                scene.layers.insert(index, layer.clone());
                scene.current = *previous_current;
            }

            Command::MoveLayer { from, to } => move_layer(scene, *to, *from),

            Command::SetLayerLocked { index, locked } => {
                if let Some(layer) = scene.layers.get_mut(*index) {
                    layer.locked = !*locked;
                }
            }

            Command::ClearLayer { index, strokes } => {
                if let Some(layer) = scene.layers.get_mut(*index) {
                    *layer.strokes_mut() = strokes.clone();
                }
            }

            Command::ClearAll { snapshots } => {
                for (layer, strokes) in scene.layers.iter_mut().zip(snapshots) {
                    *layer.strokes_mut() = strokes.clone();
                }
            }
        }
    }

    /// Replays the mutation this command records.
    pub fn redo(&self, scene: &mut SceneGraph) {
        match self {
            Command::AddStroke { layer, stroke } => {
                if let Some(layer) = scene.layers.get_mut(*layer) {
                    layer.strokes_mut().push(stroke.clone());
                }
            }

            Command::AddLayer {
                index,
                layer,
                new_current,
                ..
            } => {
                let index = (*index).min(scene.layers.len());
                scene.layers.insert(index, layer.clone());
                scene.current = *new_current;
            }

            Command::RemoveLayer {
                index, new_current, ..
            } => {
                if *index < scene.layers.len() {
                    scene.layers.remove(*index);
                }
                scene.current = *new_current;
            }

            Command::MoveLayer { from, to } => move_layer(scene, *from, *to),

            Command::SetLayerLocked { index, locked } => {
                if let Some(layer) = scene.layers.get_mut(*index) {
                    layer.locked = *locked;
                }
            }

            Command::ClearLayer { index, .. } => {
                if let Some(layer) = scene.layers.get_mut(*index) {
                    layer.strokes_mut().clear();
                }
            }

            Command::ClearAll { .. } => {
                for layer in &mut scene.layers {
                    layer.strokes_mut().clear();
                }
            }
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "add-stroke",
            Command::AddLayer { .. } => "add-layer",
            Command::RemoveLayer { .. } => "remove-layer",
            Command::MoveLayer { .. } => "move-layer",
            Command::SetLayerLocked { .. } => "set-layer-locked",
            Command::ClearLayer { .. } => "clear-layer",
            Command::ClearAll { .. } => "clear-all",
        }
    }
}

fn move_layer(scene: &mut SceneGraph, from: usize, to: usize) {
    if from < scene.layers.len() && to < scene.layers.len() {
        let layer = scene.layers.remove(from);
        scene.layers.insert(to, layer);
    }
}

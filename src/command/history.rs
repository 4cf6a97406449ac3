use log::{debug, trace};

use super::Command;
use crate::canvas::SceneGraph;

/// Dual-stack command log driving undo/redo.
///
/// History is linear: recording a new command while undone commands are
/// pending discards the redo stack, so there are no branching timelines.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an already-applied command and invalidates pending redos.
    pub fn record(&mut self, command: Command) {
        trace!("history: record {}", command.label());
        self.redo_stack.clear();
        self.undo_stack.push(command);
    }

    /// Reverts the most recent command. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self, scene: &mut SceneGraph) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        debug!("history: undo {}", command.label());
        command.undo(scene);
        self.redo_stack.push(command);
        true
    }

    /// Replays the most recently undone command. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self, scene: &mut SceneGraph) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        debug!("history: redo {}", command.label());
        command.redo(scene);
        self.undo_stack.push(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drops both stacks, e.g. after loading a persisted scene.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::Brush;
    use crate::layer::Layer;
    use crate::stroke::Stroke;

    fn scene_with_layer() -> SceneGraph {
        SceneGraph {
            layers: vec![Layer::new("layer 0")],
            current: Some(0),
        }
    }

    fn stroke() -> Stroke {
        use egui::pos2;
        let mut s = Stroke::begin(Brush::default(), pos2(0.0, 0.0), 1.0);
        s.append(pos2(1.0, 0.0), 1.0);
        s.finish();
        s
    }

    #[test]
    fn undo_then_redo_restores_the_stroke() {
        let mut scene = scene_with_layer();
        let mut history = CommandHistory::new();

        scene.layers[0].add_stroke(stroke());
        history.record(Command::AddStroke {
            layer: 0,
            stroke: stroke(),
        });

        assert!(history.undo(&mut scene));
        assert!(scene.layers[0].is_empty());

        assert!(history.redo(&mut scene));
        assert_eq!(scene.layers[0].strokes().len(), 1);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut scene = scene_with_layer();
        let mut history = CommandHistory::new();

        assert!(!history.undo(&mut scene));
        assert!(!history.redo(&mut scene));
    }

    #[test]
    fn recording_clears_pending_redos() {
        let mut scene = scene_with_layer();
        let mut history = CommandHistory::new();

        scene.layers[0].add_stroke(stroke());
        history.record(Command::AddStroke {
            layer: 0,
            stroke: stroke(),
        });
        history.undo(&mut scene);
        assert!(history.can_redo());

        history.record(Command::ClearLayer {
            index: 0,
            strokes: Vec::new(),
        });
        assert!(!history.can_redo());
        assert!(!history.redo(&mut scene));
    }

    #[test]
    fn snapshots_are_immune_to_later_mutation() {
        let mut scene = scene_with_layer();
        let mut history = CommandHistory::new();

        scene.layers[0].add_stroke(stroke());
        history.record(Command::AddStroke {
            layer: 0,
            stroke: stroke(),
        });

        // Mutate the live layer after recording; replay must still restore
        // the recorded stroke, not the mutated state.
        scene.layers[0].strokes_mut()[0].brush_mut().size = 99.0;

        history.undo(&mut scene);
        history.redo(&mut scene);
        assert_eq!(scene.layers[0].strokes()[0].brush().size, 10.0);
    }
}

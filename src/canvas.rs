use std::collections::BTreeMap;

use egui::{Color32, Pos2};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::brush::Brush;
use crate::command::{Command, CommandHistory};
use crate::error::CanvasError;
use crate::event::{CanvasListener, LayerChange};
use crate::input::{InputEvent, InputSample, PointerKind, simulated_force};
use crate::layer::Layer;
use crate::render::{RenderTarget, TextureLoader};
use crate::stroke::Stroke;
use crate::texture::TextureManager;
use crate::tool::{self, ToolKind};

/// The layer stack plus the active-layer cursor. This is the state undo/redo
/// replays against, split out from [`Canvas`] so history can mutate it while
/// the canvas keeps ownership of everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Composited back to front by index.
    pub layers: Vec<Layer>,
    /// The only layer eligible to receive new strokes. `None` when the stack
    /// is empty.
    pub current: Option<usize>,
}

impl SceneGraph {
    /// Whether the current index points at an existing, unlocked layer.
    pub fn on_unlocked_layer(&self) -> bool {
        self.current
            .and_then(|i| self.layers.get(i))
            .is_some_and(|layer| !layer.locked)
    }
}

/// The stroke currently being drawn, plus the pointer-down origin the shape
/// tools rebuild from.
#[derive(Debug, Clone)]
struct ActiveStroke {
    stroke: Stroke,
    origin: Pos2,
}

/// A drawing surface: layered scene graph, brush and texture registries,
/// the in-progress stroke, and the command history that makes every
/// mutation reversible.
///
/// All mutation is synchronous on the owning thread. Rendering via
/// [`Canvas::render`] is read-only and may be invoked repeatedly between
/// mutations.
pub struct Canvas {
    pub(crate) scene: SceneGraph,
    pub(crate) brushes: BTreeMap<String, Brush>,
    pub(crate) textures: TextureManager,
    pub(crate) history: CommandHistory,

    current_brush: Brush,
    current_tool: ToolKind,
    active: Option<ActiveStroke>,

    pub(crate) force: f32,
    pub(crate) maximum_force: f32,
    force_enabled: bool,
    pub(crate) stylus_only: bool,
    /// Distance reference for simulated force on pressure-less devices.
    last_point: Option<Pos2>,

    pub(crate) background: Color32,
    listener: Option<Box<dyn CanvasListener>>,
}

impl Canvas {
    pub fn new() -> Self {
        let current_brush = Brush::default();
        let mut brushes = BTreeMap::new();
        brushes.insert(current_brush.name.clone(), current_brush.clone());

        Self {
            scene: SceneGraph::default(),
            brushes,
            textures: TextureManager::new(),
            history: CommandHistory::new(),
            current_brush,
            current_tool: ToolKind::default(),
            active: None,
            force: 1.0,
            maximum_force: 1.0,
            force_enabled: true,
            stylus_only: false,
            last_point: None,
            background: Color32::TRANSPARENT,
            listener: None,
        }
    }

    // ---> Scene access

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn layers(&self) -> &[Layer] {
        &self.scene.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.scene.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.scene.layers.len()
    }

    pub fn current_layer(&self) -> Option<usize> {
        self.scene.current
    }

    /// The stroke currently being drawn, if any.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref().map(|a| &a.stroke)
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    // ---> Brushes

    /// Registers a brush under its name, replacing any previous registration.
    /// Eraser brushes are snapped to the current background color.
    pub fn add_brush(&mut self, brush: Brush) {
        let mut brush = brush;
        brush.track_background(self.background);
        trace!("registered brush {:?}", brush.name);
        self.brushes.insert(brush.name.clone(), brush);
    }

    /// A copy of the registered brush with the given name.
    pub fn brush(&self, name: &str) -> Option<Brush> {
        self.brushes.get(name).cloned()
    }

    /// Makes the named registered brush the one new strokes capture.
    pub fn change_brush(&mut self, name: &str) -> Result<(), CanvasError> {
        let brush = self
            .brushes
            .get(name)
            .cloned()
            .ok_or_else(|| CanvasError::UnknownBrush(name.to_string()))?;
        self.current_brush = brush;
        self.notify(|l| l.brush_changed(name));
        Ok(())
    }

    /// Points a registered brush at a registered texture. Strokes resolve
    /// the texture by name at submit time, so the texture may be re-uploaded
    /// later without touching the brush.
    pub fn set_brush_texture(&mut self, brush: &str, texture: &str) -> Result<(), CanvasError> {
        if !self.textures.contains(texture) {
            return Err(CanvasError::UnknownTexture(texture.to_string()));
        }
        let brush = self
            .brushes
            .get_mut(brush)
            .ok_or_else(|| CanvasError::UnknownBrush(brush.to_string()))?;
        brush.texture = Some(texture.to_string());
        Ok(())
    }

    /// Replaces the current brush with an ad-hoc configuration, without
    /// touching the registry.
    pub fn set_current_brush(&mut self, brush: Brush) {
        let mut brush = brush;
        brush.track_background(self.background);
        self.current_brush = brush;
    }

    pub fn current_brush(&self) -> &Brush {
        &self.current_brush
    }

    // ---> Tools

    pub fn change_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.notify(|l| l.tool_changed(tool));
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    // ---> Background & force

    /// Sets the background color. Eraser brushes, registered or current,
    /// follow it.
    pub fn set_background(&mut self, color: Color32) {
        self.background = color;
        for brush in self.brushes.values_mut() {
            brush.track_background(color);
        }
        self.current_brush.track_background(color);
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    /// Whether reported pressure modulates stroke width. When disabled every
    /// sample draws at full force.
    pub fn set_force_enabled(&mut self, enabled: bool) {
        self.force_enabled = enabled;
    }

    pub fn set_maximum_force(&mut self, maximum: f32) {
        self.maximum_force = maximum.clamp(0.0, 1.0);
    }

    pub fn maximum_force(&self) -> f32 {
        self.maximum_force
    }

    pub fn force(&self) -> f32 {
        self.force
    }

    /// Restricts drawing to stylus samples; touch and mouse input is ignored.
    pub fn set_stylus_only(&mut self, stylus_only: bool) {
        self.stylus_only = stylus_only;
    }

    fn update_force(&mut self, sample: &InputSample) {
        if !self.force_enabled {
            self.force = 1.0;
            return;
        }
        self.force = match sample.force {
            Some(force) => force.clamp(0.0, self.maximum_force),
            None => {
                let distance = self
                    .last_point
                    .map_or(0.0, |p| p.distance(sample.position));
                simulated_force(distance)
            }
        };
    }

    // ---> Textures

    /// Decodes image bytes and registers the texture under `name`.
    pub fn add_texture(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        loader: &mut dyn TextureLoader,
    ) -> Result<(), CanvasError> {
        self.textures.register(name, bytes, loader)
    }

    pub fn texture_id(&self, name: &str) -> Option<egui::TextureId> {
        self.textures.id(name)
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    /// Uploads textures that were restored from a snapshot and have no
    /// backend handle yet.
    pub fn rebind_textures(&self, loader: &mut dyn TextureLoader) -> Result<(), CanvasError> {
        self.textures.rebind(loader)
    }

    // ---> Stroke lifecycle

    /// Routes a pointer event to the stroke lifecycle. Returns whether the
    /// event changed anything.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown(sample) => self.begin_stroke(sample),
            InputEvent::PointerMove(samples) => self.continue_stroke(&samples),
            InputEvent::PointerUp(_) => self.end_stroke(),
            InputEvent::PointerCancel => self.cancel_stroke(),
        }
    }

    /// Starts a stroke at the sample position, opening its first quad.
    ///
    /// No-op returning `false` when a stroke is already active, the sample is
    /// filtered by the stylus-only policy, or the current layer is missing or
    /// locked.
    pub fn begin_stroke(&mut self, sample: InputSample) -> bool {
        if self.active.is_some() {
            return false;
        }
        if self.stylus_only && sample.kind != PointerKind::Stylus {
            return false;
        }
        if !self.scene.on_unlocked_layer() {
            return false;
        }

        self.update_force(&sample);
        let mut brush = self.current_brush.clone();
        if self.current_tool == ToolKind::Eraser && !brush.is_eraser {
            brush.is_eraser = true;
            brush.texture = None;
            brush.color = self.background;
        }

        self.active = Some(ActiveStroke {
            stroke: Stroke::begin(brush, sample.position, self.force),
            origin: sample.position,
        });
        self.last_point = Some(sample.position);
        true
    }

    /// Extends the active stroke with a batch of coalesced/predicted samples.
    ///
    /// Freehand tools close one quad per sample; shape tools retessellate
    /// their outline from the pointer-down origin to the newest sample.
    /// No-op returning `false` when no stroke is active or the layer became
    /// invalid.
    pub fn continue_stroke(&mut self, samples: &[InputSample]) -> bool {
        if self.active.is_none() || !self.scene.on_unlocked_layer() {
            return false;
        }

        let mut extended = false;
        for sample in samples {
            if self.stylus_only && sample.kind != PointerKind::Stylus {
                continue;
            }
            self.update_force(sample);
            let force = self.force;

            let Some(active) = self.active.as_mut() else {
                return extended;
            };
            match self.current_tool {
                ToolKind::Pencil | ToolKind::Eraser => {
                    active.stroke.append(sample.position, force);
                }
                ToolKind::Line => {
                    active
                        .stroke
                        .retessellate(&[active.origin, sample.position], force);
                }
                ToolKind::Rectangle => {
                    let outline = tool::rectangle_outline(active.origin, sample.position);
                    active.stroke.retessellate(&outline, force);
                }
                ToolKind::Ellipse => {
                    let outline = tool::ellipse_outline(active.origin, sample.position);
                    active.stroke.retessellate(&outline, force);
                }
            }
            self.last_point = Some(sample.position);
            extended = true;
        }
        extended
    }

    /// Finishes the active stroke. A stroke with at least one closed quad on
    /// a still-valid layer is committed and recorded in history; an empty
    /// stroke, or one whose layer went away or got locked mid-draw, is
    /// discarded.
    pub fn end_stroke(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.last_point = None;

        let mut stroke = active.stroke;
        stroke.finish();

        if stroke.is_empty() || !self.scene.on_unlocked_layer() {
            trace!("discarding stroke ({} quads)", stroke.quads().len());
            return false;
        }
        let Some(index) = self.scene.current else {
            return false;
        };

        debug!(
            "committing stroke with {} quads to layer {index}",
            stroke.quads().len()
        );
        self.scene.layers[index].add_stroke(stroke.clone());
        self.history.record(Command::AddStroke {
            layer: index,
            stroke,
        });
        self.notify(|l| l.stroke_committed(index));
        true
    }

    /// Drops the active stroke without committing geometry or recording
    /// history.
    pub fn cancel_stroke(&mut self) -> bool {
        self.last_point = None;
        self.active.take().is_some()
    }

    // ---> Layers

    /// Inserts a new empty layer at `index`. When the stack is empty the
    /// index is ignored: the first layer always lands at 0 and becomes
    /// current.
    pub fn add_layer(&mut self, index: usize) -> Result<(), CanvasError> {
        let previous_current = self.scene.current;
        let name = format!("Layer {}", self.scene.layers.len() + 1);

        let index = if self.scene.layers.is_empty() {
            self.scene.layers.push(Layer::new(&name));
            self.scene.current = Some(0);
            0
        } else {
            if index > self.scene.layers.len() {
                return Err(CanvasError::LayerOutOfRange(index));
            }
            self.scene.layers.insert(index, Layer::new(&name));
            index
        };

        self.history.record(Command::AddLayer {
            index,
            layer: self.scene.layers[index].clone(),
            previous_current,
            new_current: self.scene.current,
        });
        self.notify(|l| l.layer_changed(LayerChange::Added { index }));
        Ok(())
    }

    /// Removes the layer at `index`, re-clamping the current index to the
    /// last valid layer (or none when the stack empties).
    pub fn remove_layer(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.scene.layers.len() {
            return Err(CanvasError::LayerOutOfRange(index));
        }
        let previous_current = self.scene.current;
        let layer = self.scene.layers.remove(index);

        self.scene.current = if self.scene.layers.is_empty() {
            None
        } else {
            self.scene
                .current
                .map(|c| c.min(self.scene.layers.len() - 1))
        };

        self.history.record(Command::RemoveLayer {
            index,
            layer,
            previous_current,
            new_current: self.scene.current,
        });
        self.notify(|l| l.layer_changed(LayerChange::Removed { index }));
        Ok(())
    }

    /// Moves the layer at `from` to position `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), CanvasError> {
        let count = self.scene.layers.len();
        if from >= count {
            return Err(CanvasError::LayerOutOfRange(from));
        }
        if to >= count {
            return Err(CanvasError::LayerOutOfRange(to));
        }
        if from == to {
            return Ok(());
        }

        let layer = self.scene.layers.remove(from);
        self.scene.layers.insert(to, layer);
        self.history.record(Command::MoveLayer { from, to });
        self.notify(|l| l.layer_changed(LayerChange::Moved { from, to }));
        Ok(())
    }

    /// Locks or unlocks the layer at `index`. Recorded in history only when
    /// the flag actually changes.
    pub fn set_layer_locked(&mut self, index: usize, locked: bool) -> Result<(), CanvasError> {
        let layer = self
            .scene
            .layers
            .get_mut(index)
            .ok_or(CanvasError::LayerOutOfRange(index))?;
        if layer.locked == locked {
            return Ok(());
        }
        layer.locked = locked;
        self.history.record(Command::SetLayerLocked { index, locked });
        self.notify(|l| l.layer_changed(LayerChange::LockChanged { index, locked }));
        Ok(())
    }

    /// Shows or hides the layer at `index`. Visibility is a view concern and
    /// is not recorded in history.
    pub fn set_layer_hidden(&mut self, index: usize, hidden: bool) -> Result<(), CanvasError> {
        let layer = self
            .scene
            .layers
            .get_mut(index)
            .ok_or(CanvasError::LayerOutOfRange(index))?;
        layer.hidden = hidden;
        self.notify(|l| l.layer_changed(LayerChange::VisibilityChanged { index, hidden }));
        Ok(())
    }

    /// Makes the layer at `index` the target for new strokes.
    pub fn select_layer(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.scene.layers.len() {
            return Err(CanvasError::LayerOutOfRange(index));
        }
        self.scene.current = Some(index);
        self.notify(|l| l.layer_changed(LayerChange::Selected { index: Some(index) }));
        Ok(())
    }

    /// Removes every stroke from the layer at `index`.
    pub fn clear_layer(&mut self, index: usize) -> Result<(), CanvasError> {
        let layer = self
            .scene
            .layers
            .get_mut(index)
            .ok_or(CanvasError::LayerOutOfRange(index))?;
        let strokes = std::mem::take(layer.strokes_mut());

        self.history.record(Command::ClearLayer { index, strokes });
        self.notify(|l| l.cleared(Some(index)));
        Ok(())
    }

    /// Removes every stroke from every layer. The layer stack itself stays.
    pub fn clear_all(&mut self) {
        let snapshots: Vec<Vec<Stroke>> = self
            .scene
            .layers
            .iter_mut()
            .map(|layer| std::mem::take(layer.strokes_mut()))
            .collect();

        self.history.record(Command::ClearAll { snapshots });
        self.notify(|l| l.cleared(None));
    }

    // ---> History

    pub fn undo(&mut self) -> bool {
        let performed = self.history.undo(&mut self.scene);
        if performed {
            self.notify(|l| l.undo_performed());
        }
        performed
    }

    pub fn redo(&mut self) -> bool {
        let performed = self.history.redo(&mut self.scene);
        if performed {
            self.notify(|l| l.redo_performed());
        }
        performed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---> Composition

    /// Submits all visible geometry to `target`: layers in ascending order,
    /// strokes in insertion order, then the in-progress stroke on top.
    /// Read-only; safe to call repeatedly.
    pub fn render(&self, target: &mut dyn RenderTarget) {
        for layer in &self.scene.layers {
            if layer.hidden {
                continue;
            }
            for stroke in layer.strokes() {
                self.submit_stroke(stroke, target);
            }
        }
        if let Some(active) = &self.active {
            self.submit_stroke(&active.stroke, target);
        }
    }

    fn submit_stroke(&self, stroke: &Stroke, target: &mut dyn RenderTarget) {
        if stroke.is_empty() {
            return;
        }
        let vertices = stroke.vertices();
        let texture = stroke
            .brush()
            .texture
            .as_deref()
            .and_then(|name| self.textures.id(name));
        target.submit(&vertices, stroke.brush().pipeline(), texture);
    }

    // ---> Events

    /// Installs the observer notified after each state change. Replaces any
    /// previous listener.
    pub fn set_listener(&mut self, listener: Box<dyn CanvasListener>) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    fn notify(&mut self, event: impl FnOnce(&mut dyn CanvasListener)) {
        if let Some(listener) = self.listener.as_deref_mut() {
            event(listener);
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

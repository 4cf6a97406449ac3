use std::collections::BTreeMap;

use egui::Color32;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brush::Brush;
use crate::canvas::{Canvas, SceneGraph};
use crate::error::CanvasError;
use crate::geometry::Quad;
use crate::layer::Layer;
use crate::stroke::Stroke;

fn default_force() -> f32 {
    1.0
}

fn default_background() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// A persisted stroke: the name of the brush it was drawn with plus its
/// closed quads, vertices included. Decoding resolves the name against the
/// snapshot's brush registry; the baked vertex data keeps committed geometry
/// exact even when the registered brush has changed since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub brush: String,
    #[serde(default)]
    pub quads: Vec<Quad>,
}

/// A persisted layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub strokes: Vec<StrokeRecord>,
}

/// The complete persisted canvas state.
///
/// Every field is optional on decode and falls back to a documented default,
/// so a partially written or older snapshot still loads: no layers, force
/// and maximum force 1.0, no registries, stylus-only off, opaque black
/// background, no current layer. Registries use ordered maps so encoding is
/// deterministic and `serialize -> deserialize -> serialize` is byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
    #[serde(default = "default_force")]
    pub force: f32,
    #[serde(default = "default_force")]
    pub maximum_force: f32,
    /// Encoded image blobs by texture name. `None` means the name is
    /// registered but has no image ("no texture").
    #[serde(default)]
    pub textures: BTreeMap<String, Option<Vec<u8>>>,
    #[serde(default)]
    pub brushes: BTreeMap<String, Brush>,
    #[serde(default)]
    pub stylus_only: bool,
    #[serde(default = "default_background")]
    pub background: [f32; 4],
    #[serde(default)]
    pub current_layer: Option<usize>,
}

impl Default for CanvasSnapshot {
    fn default() -> Self {
        // Matches what `{}` decodes to.
        Self {
            layers: Vec::new(),
            force: default_force(),
            maximum_force: default_force(),
            textures: BTreeMap::new(),
            brushes: BTreeMap::new(),
            stylus_only: false,
            background: default_background(),
            current_layer: None,
        }
    }
}

impl Canvas {
    /// Captures the persistable canvas state.
    pub fn snapshot(&self) -> CanvasSnapshot {
        let layers = self
            .scene
            .layers
            .iter()
            .map(|layer| LayerRecord {
                id: layer.id,
                name: layer.name.clone(),
                hidden: layer.hidden,
                locked: layer.locked,
                strokes: layer
                    .strokes()
                    .iter()
                    .map(|stroke| StrokeRecord {
                        brush: stroke.brush().name.clone(),
                        quads: stroke.quads().to_vec(),
                    })
                    .collect(),
            })
            .collect();

        let bg = self.background;
        CanvasSnapshot {
            layers,
            force: self.force,
            maximum_force: self.maximum_force,
            textures: self.textures.export(),
            brushes: self.brushes.clone(),
            stylus_only: self.stylus_only,
            background: [
                bg.r() as f32 / 255.0,
                bg.g() as f32 / 255.0,
                bg.b() as f32 / 255.0,
                bg.a() as f32 / 255.0,
            ],
            current_layer: self.scene.current,
        }
    }

    /// Replaces the canvas state with a decoded snapshot.
    ///
    /// History and any in-progress stroke are dropped; restored textures keep
    /// their blobs but need [`Canvas::rebind_textures`] before they resolve
    /// to backend handles. Strokes whose brush name is no longer registered
    /// fall back to the default brush.
    pub fn restore(&mut self, snapshot: CanvasSnapshot) {
        debug!(
            "restoring canvas snapshot: {} layers, {} brushes, {} textures",
            snapshot.layers.len(),
            snapshot.brushes.len(),
            snapshot.textures.len()
        );

        let [r, g, b, a] = snapshot.background;
        self.background = Color32::from_rgba_premultiplied(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            (a * 255.0).round() as u8,
        );

        self.brushes = snapshot.brushes;
        self.brushes
            .entry(Brush::default().name)
            .or_insert_with(Brush::default);
        for brush in self.brushes.values_mut() {
            brush.track_background(self.background);
        }

        let layers = snapshot
            .layers
            .into_iter()
            .map(|record| {
                let strokes = record
                    .strokes
                    .into_iter()
                    .map(|stroke| {
                        let brush = self
                            .brushes
                            .get(&stroke.brush)
                            .cloned()
                            .unwrap_or_default();
                        Stroke::from_quads(brush, stroke.quads)
                    })
                    .collect();
                let mut layer = Layer::with_strokes(&record.name, strokes);
                layer.id = record.id;
                layer.hidden = record.hidden;
                layer.locked = record.locked;
                layer
            })
            .collect::<Vec<_>>();

        let current = snapshot
            .current_layer
            .filter(|&index| index < layers.len());
        self.scene = SceneGraph { layers, current };

        self.force = snapshot.force;
        self.maximum_force = snapshot.maximum_force.clamp(0.0, 1.0);
        self.stylus_only = snapshot.stylus_only;

        self.textures.clear();
        for (name, bytes) in snapshot.textures {
            self.textures.register_raw(&name, bytes);
        }

        self.cancel_stroke();
        self.history.clear();
    }

    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Canvas, CanvasError> {
        let snapshot: CanvasSnapshot = serde_json::from_str(json)?;
        let mut canvas = Canvas::new();
        canvas.restore(snapshot);
        Ok(canvas)
    }
}

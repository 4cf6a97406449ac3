use egui::Color32;
use serde::{Deserialize, Serialize};

/// Render pipeline selection for a stroke, derived from its brush.
///
/// The canvas core never touches GPU state; the rendering collaborator maps
/// these to whatever pipeline objects it compiled at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineKind {
    /// Flat-colored geometry.
    Solid,
    /// Geometry sampled against a registered texture.
    Textured,
    /// Background-colored geometry with eraser blend state.
    Eraser,
}

/// A named styling configuration for strokes.
///
/// A stroke captures a copy of its brush when it begins, so editing a
/// registered brush never retroactively changes committed geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Unique registry key.
    pub name: String,
    /// Full stroke width at full pressure, in surface units.
    pub size: f32,
    pub color: Color32,
    /// Name of a texture registered on the canvas, if any.
    pub texture: Option<String>,
    /// Eraser brushes track the canvas background color instead of keeping
    /// their own.
    pub is_eraser: bool,
}

impl Brush {
    pub fn new(name: &str, size: f32, color: Color32) -> Self {
        Self {
            name: name.to_string(),
            size,
            color,
            texture: None,
            is_eraser: false,
        }
    }

    /// A brush that paints with the canvas background color.
    pub fn eraser(name: &str, size: f32, background: Color32) -> Self {
        Self {
            name: name.to_string(),
            size,
            color: background,
            texture: None,
            is_eraser: true,
        }
    }

    pub fn with_texture(mut self, name: &str) -> Self {
        self.texture = Some(name.to_string());
        self
    }

    pub fn pipeline(&self) -> PipelineKind {
        if self.is_eraser {
            PipelineKind::Eraser
        } else if self.texture.is_some() {
            PipelineKind::Textured
        } else {
            PipelineKind::Solid
        }
    }

    /// Re-syncs an eraser brush with the canvas background. No-op for
    /// ordinary brushes.
    pub(crate) fn track_background(&mut self, background: Color32) {
        if self.is_eraser {
            self.color = background;
        }
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new("default", 10.0, Color32::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_selection() {
        let plain = Brush::new("plain", 4.0, Color32::RED);
        assert_eq!(plain.pipeline(), PipelineKind::Solid);

        let textured = plain.clone().with_texture("paper");
        assert_eq!(textured.pipeline(), PipelineKind::Textured);

        let eraser = Brush::eraser("eraser", 12.0, Color32::WHITE);
        assert_eq!(eraser.pipeline(), PipelineKind::Eraser);
    }

    #[test]
    fn only_erasers_track_background() {
        let mut eraser = Brush::eraser("eraser", 12.0, Color32::WHITE);
        let mut plain = Brush::new("plain", 4.0, Color32::RED);

        eraser.track_background(Color32::BLUE);
        plain.track_background(Color32::BLUE);

        assert_eq!(eraser.color, Color32::BLUE);
        assert_eq!(plain.color, Color32::RED);
    }
}

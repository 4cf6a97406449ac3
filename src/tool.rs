use egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

/// Number of segments used to approximate an ellipse outline.
const ELLIPSE_SEGMENTS: usize = 32;

/// The closed set of drawing tools.
///
/// Tools share the begin/continue/end/cancel stroke lifecycle and differ only
/// in how pointer movement shapes the in-progress stroke, so the canvas
/// dispatches over this enum with a `match` rather than trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// Freehand drawing: every sample extends the quad chain.
    #[default]
    Pencil,
    /// A straight segment from the pointer-down origin to the current point.
    Line,
    /// An axis-aligned rectangle outline spanned by origin and current point.
    Rectangle,
    /// An ellipse outline inscribed in that same span.
    Ellipse,
    /// Freehand like the pencil, but painting with the eraser pipeline in the
    /// canvas background color.
    Eraser,
}

/// Outline path for the rectangle tool: the four corners, closed.
pub(crate) fn rectangle_outline(origin: Pos2, corner: Pos2) -> Vec<Pos2> {
    vec![
        origin,
        pos2(corner.x, origin.y),
        corner,
        pos2(origin.x, corner.y),
        origin,
    ]
}

/// Outline path for the ellipse tool, inscribed in the rectangle spanned by
/// `origin` and `corner`.
pub(crate) fn ellipse_outline(origin: Pos2, corner: Pos2) -> Vec<Pos2> {
    let center = pos2(0.5 * (origin.x + corner.x), 0.5 * (origin.y + corner.y));
    let rx = 0.5 * (corner.x - origin.x).abs();
    let ry = 0.5 * (corner.y - origin.y).abs();

    (0..=ELLIPSE_SEGMENTS)
        .map(|i| {
            let theta = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            pos2(center.x + rx * theta.cos(), center.y + ry * theta.sin())
        })
        .collect()
}

use egui::{Color32, Pos2, Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::brush::Brush;

/// Floor for the half-width of a quad so zero pressure never collapses a
/// segment into degenerate geometry.
pub const MIN_HALF_WIDTH: f32 = 1.0e-3;

/// A single renderable vertex: position in normalized device coordinates,
/// RGBA color, and the rotation (radians) of the segment it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Pos2,
    pub color: Color32,
    pub rotation: f32,
}

impl Vertex {
    pub fn new(position: Pos2, color: Color32, rotation: f32) -> Self {
        Self {
            position,
            color,
            rotation,
        }
    }
}

/// A quad that has been opened with a start anchor but not yet closed.
///
/// Closing it consumes the pending quad and produces a [`Quad`], so a
/// half-built segment can never be rendered or committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingQuad {
    pub start: Pos2,
    pub start_force: f32,
}

impl PendingQuad {
    pub fn new(start: Pos2, start_force: f32) -> Self {
        Self { start, start_force }
    }

    /// Closes the quad at `end`, computing all four corners.
    ///
    /// The corners are the anchors offset perpendicular to the segment
    /// direction by a pressure-derived half-width. When `previous` is given,
    /// the new quad's leading corners are taken verbatim from its trailing
    /// corners so consecutive segments share an edge even when the direction
    /// changes sharply.
    pub fn close(self, end: Pos2, end_force: f32, brush: &Brush, previous: Option<&Quad>) -> Quad {
        let dir = end - self.start;
        let rotation = if dir == Vec2::ZERO {
            0.0
        } else {
            dir.y.atan2(dir.x)
        };

        let average_force = 0.5 * (self.start_force + end_force);
        let half_width = (average_force * brush.size * 0.5).max(MIN_HALF_WIDTH);
        let offset = perpendicular(dir) * half_width;

        let color = brush.color;
        let mut a = Vertex::new(self.start + offset, color, rotation);
        let mut b = Vertex::new(self.start - offset, color, rotation);
        let c = Vertex::new(end + offset, color, rotation);
        let d = Vertex::new(end - offset, color, rotation);

        if let Some(prev) = previous {
            a.position = prev.c.position;
            b.position = prev.d.position;
        }

        Quad {
            a,
            b,
            c,
            d,
            start: self.start,
            end,
            start_force: self.start_force,
            end_force,
        }
    }
}

/// A closed, tessellated stroke segment: four corner vertices plus the raw
/// anchors and pressures they were derived from.
///
/// Corner layout along the segment from `start` to `end`:
/// `a`/`b` are the leading edge, `c`/`d` the trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
    pub d: Vertex,
    pub start: Pos2,
    pub end: Pos2,
    pub start_force: f32,
    pub end_force: f32,
}

impl Quad {
    /// The quad as a triangle list (two triangles, six vertices).
    pub fn vertices(&self) -> [Vertex; 6] {
        [self.a, self.b, self.c, self.b, self.c, self.d]
    }

    /// Signed-area magnitude of the quadrilateral, via the shoelace formula
    /// over `a -> c -> d -> b`.
    pub fn area(&self) -> f32 {
        let ring = [
            self.a.position,
            self.c.position,
            self.d.position,
            self.b.position,
        ];
        let mut doubled = 0.0;
        for i in 0..ring.len() {
            let p = ring[i];
            let q = ring[(i + 1) % ring.len()];
            doubled += p.x * q.y - q.x * p.y;
        }
        (doubled * 0.5).abs()
    }
}

/// Unit vector perpendicular to `dir`, or straight up for a zero-length
/// segment so a stationary sample still yields finite corners.
fn perpendicular(dir: Vec2) -> Vec2 {
    if dir == Vec2::ZERO {
        vec2(0.0, 1.0)
    } else {
        vec2(-dir.y, dir.x).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn test_brush() -> Brush {
        Brush::new("test", 10.0, Color32::BLACK)
    }

    #[test]
    fn horizontal_segment_offsets_vertically() {
        let quad = PendingQuad::new(pos2(0.0, 0.0), 1.0).close(pos2(2.0, 0.0), 1.0, &test_brush(), None);

        // Full pressure on a size-10 brush: half-width 5.
        assert_eq!(quad.a.position, pos2(0.0, 5.0));
        assert_eq!(quad.b.position, pos2(0.0, -5.0));
        assert_eq!(quad.c.position, pos2(2.0, 5.0));
        assert_eq!(quad.d.position, pos2(2.0, -5.0));
        assert_eq!(quad.a.rotation, 0.0);
    }

    #[test]
    fn leading_edge_inherits_previous_trailing_edge() {
        let brush = test_brush();
        let first = PendingQuad::new(pos2(0.0, 0.0), 1.0).close(pos2(1.0, 0.0), 1.0, &brush, None);
        // Sharp turn upward: without the continuity rule the offsets would
        // not line up with the previous trailing edge.
        let second =
            PendingQuad::new(pos2(1.0, 0.0), 1.0).close(pos2(1.0, 1.0), 1.0, &brush, Some(&first));

        assert_eq!(second.a.position, first.c.position);
        assert_eq!(second.b.position, first.d.position);
    }

    #[test]
    fn zero_pressure_still_produces_positive_area() {
        let quad = PendingQuad::new(pos2(0.0, 0.0), 0.0).close(pos2(1.0, 1.0), 0.0, &test_brush(), None);
        assert!(quad.area() > 0.0);
    }

    #[test]
    fn stationary_sample_yields_finite_corners() {
        let quad = PendingQuad::new(pos2(0.5, 0.5), 0.7).close(pos2(0.5, 0.5), 0.7, &test_brush(), None);
        for v in quad.vertices() {
            assert!(v.position.x.is_finite() && v.position.y.is_finite());
        }
    }

    #[test]
    fn rotation_follows_segment_direction() {
        let quad = PendingQuad::new(pos2(0.0, 0.0), 1.0).close(pos2(0.0, 3.0), 1.0, &test_brush(), None);
        assert!((quad.a.rotation - std::f32::consts::FRAC_PI_2).abs() < 1.0e-6);
    }
}

use egui::Pos2;

/// Segment lengths shorter than this contribute the maximum simulated force.
const SIMULATED_LENGTH_MIN: f32 = 100.0;
/// Segment lengths longer than this contribute the minimum simulated force.
const SIMULATED_LENGTH_MAX: f32 = 5000.0;
/// Scale from normalized-device-coordinate distances to the display-unit
/// range the simulated force curve was tuned for.
const SIMULATED_LENGTH_SCALE: f32 = 1000.0;

/// What produced a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Stylus,
}

/// One pointer sample: a position in normalized device coordinates plus the
/// reported pressure, if the device has any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub position: Pos2,
    /// Normalized pressure. `None` for devices without a pressure sensor;
    /// the canvas then falls back to simulated force.
    pub force: Option<f32>,
    /// Predicted samples are speculative touches the platform expects to
    /// arrive next; they are tessellated like real ones.
    pub predicted: bool,
    pub kind: PointerKind,
}

impl InputSample {
    pub fn new(position: Pos2, kind: PointerKind) -> Self {
        Self {
            position,
            force: None,
            predicted: false,
            kind,
        }
    }

    pub fn with_force(mut self, force: f32) -> Self {
        self.force = Some(force);
        self
    }

    pub fn predicted(mut self) -> Self {
        self.predicted = true;
        self
    }
}

/// The pointer event stream the canvas consumes. Move events carry every
/// coalesced and predicted sample reported since the last frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(InputSample),
    PointerMove(Vec<InputSample>),
    PointerUp(InputSample),
    PointerCancel,
}

/// Pressure substitute for devices without a force sensor, derived from the
/// distance between consecutive samples: short, dense segments press harder
/// than long, fast ones. Output stays within a fixed numeric range.
pub fn simulated_force(distance: f32) -> f32 {
    let length = (distance * SIMULATED_LENGTH_SCALE).clamp(SIMULATED_LENGTH_MIN, SIMULATED_LENGTH_MAX);
    (1000.0 / length).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_force_decreases_with_distance() {
        let near = simulated_force(0.05);
        let far = simulated_force(3.0);
        assert!(near > far);
    }

    #[test]
    fn simulated_force_is_clamped() {
        let max = (1000.0 / SIMULATED_LENGTH_MIN).sqrt();
        let min = (1000.0 / SIMULATED_LENGTH_MAX).sqrt();
        assert_eq!(simulated_force(0.0), max);
        assert_eq!(simulated_force(1.0e6), min);
    }
}

use crate::constants::*;
use crate::types::Axis;
use std::ops::RangeInclusive;

/// Operator input from the button panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ToggleAxis,
    /// Signed angle change in whole degrees for the selected axis.
    Nudge(i32),
}

impl InputEvent {
    /// Parse a console key command: `a` toggles, `+`/`-` step by 1, `++`/`--` by 10.
    pub fn parse(line: &str) -> Option<InputEvent> {
        match line.trim() {
            "a" => Some(InputEvent::ToggleAxis),
            "+" => Some(InputEvent::Nudge(FINE_STEP)),
            "-" => Some(InputEvent::Nudge(-FINE_STEP)),
            "++" => Some(InputEvent::Nudge(COARSE_STEP)),
            "--" => Some(InputEvent::Nudge(-COARSE_STEP)),
            _ => None,
        }
    }
}

/// Requested pan/tilt angles with per-axis clamping.
#[derive(Debug, Clone)]
pub struct AngleInput {
    pan: i32,
    tilt: i32,
    selected: Axis,
    pan_range: RangeInclusive<i32>,
    tilt_range: RangeInclusive<i32>,
}

impl Default for AngleInput {
    fn default() -> Self {
        AngleInput::new(MIN_PAN_ANGLE..=MAX_PAN_ANGLE, MIN_TILT_ANGLE..=MAX_TILT_ANGLE)
    }
}

impl AngleInput {
    pub fn new(pan_range: RangeInclusive<i32>, tilt_range: RangeInclusive<i32>) -> Self {
        AngleInput {
            pan: 0,
            tilt: 0,
            selected: Axis::Pan,
            pan_range,
            tilt_range,
        }
    }

    pub fn selected(&self) -> Axis {
        self.selected
    }

    pub fn pan(&self) -> i32 {
        self.pan
    }

    pub fn tilt(&self) -> i32 {
        self.tilt
    }

    /// Angles to hand to `PanTiltController::set_angle`.
    pub fn requested(&self) -> (f32, f32) {
        (self.pan as f32, self.tilt as f32)
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::ToggleAxis => self.selected = self.selected.other(),
            InputEvent::Nudge(delta) => match self.selected {
                Axis::Pan => self.pan = clamp(self.pan.saturating_add(delta), &self.pan_range),
                Axis::Tilt => {
                    self.tilt = clamp(self.tilt.saturating_add(delta), &self.tilt_range)
                }
            },
        }
    }
}

fn clamp(value: i32, range: &RangeInclusive<i32>) -> i32 {
    value.max(*range.start()).min(*range.end())
}

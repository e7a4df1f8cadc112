use crate::constants::*;
use strum_macros::{Display, EnumIter};

/// Motor command selector, the first byte of every frame.
#[derive(Debug, EnumIter, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Opcode {
    EnableControl = CMD_ENABLE_CONTROL,
    SetSpeed = CMD_SET_SPEED,
    PresetPosition = CMD_PRESET_POSITION,
    RunForward = CMD_RUN_FORWARD,
    RunReverse = CMD_RUN_REVERSE,
    MoveTo = CMD_MOVE_TO,
    MoveBy = CMD_MOVE_BY,
    Free = CMD_FREE,
    Stop = CMD_STOP,
    StopDoingTaskset = CMD_STOP_DOING_TASKSET,
}

impl Opcode {
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Whether the frame carries a float argument (angle or speed).
    pub fn carries_value(self) -> bool {
        matches!(
            self,
            Opcode::SetSpeed | Opcode::PresetPosition | Opcode::MoveTo | Opcode::MoveBy
        )
    }

    pub fn frame_len(self) -> usize {
        if self.carries_value() {
            VALUE_FRAME_LEN
        } else {
            SIMPLE_FRAME_LEN
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use strum::IntoEnumIterator;
        Opcode::iter().find(|op| op.byte() == value).ok_or(value)
    }
}

#[derive(Debug, EnumIter, Display, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Axis {
    Pan,
    Tilt,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Pan => Axis::Tilt,
            Axis::Tilt => Axis::Pan,
        }
    }
}

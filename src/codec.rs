// KeiganMotor command framing
//
// Simple frame: [opcode, 0x00, 0x00, 0x00, 0x00]
// Value frame:  [opcode, 0x00, 0x00, f32 big-endian (4 bytes), 0x00, 0x00]
//
// Float arguments are sent in radians (or rad/s). Telemetry carries the
// current angle as a big-endian f32 in radians in its first four bytes.

use crate::constants::*;
use crate::types::Opcode;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Telemetry frame too short: expected at least 4 bytes, got {actual}")]
    TelemetryTooShort { actual: usize },

    #[error("Opcode {0:?} takes no value")]
    UnexpectedValue(Opcode),

    #[error("Opcode {0:?} requires a value")]
    MissingValue(Opcode),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// A complete command frame, sized by its opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFrame {
    Simple([u8; SIMPLE_FRAME_LEN]),
    WithValue([u8; VALUE_FRAME_LEN]),
}

impl CommandFrame {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CommandFrame::Simple(bytes) => bytes,
            CommandFrame::WithValue(bytes) => bytes,
        }
    }

    pub fn opcode(&self) -> u8 {
        self.as_bytes()[0]
    }

}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Degrees to radians with the firmware's constant. The product is taken in
/// double precision and narrowed, matching what the motor vendor samples emit.
pub fn deg_to_rad(deg: f32) -> f32 {
    (f64::from(deg) * DEG_TO_RAD) as f32
}

pub fn rad_to_deg(rad: f32) -> f32 {
    (f64::from(rad) * RAD_TO_DEG) as f32
}

pub fn encode_simple(opcode: Opcode) -> Result<CommandFrame> {
    if opcode.carries_value() {
        return Err(CodecError::MissingValue(opcode));
    }
    Ok(CommandFrame::Simple([opcode.byte(), 0, 0, 0, 0]))
}

/// Encode an angle (degrees) or speed (degrees per second) command.
pub fn encode_with_value(opcode: Opcode, value: f32) -> Result<CommandFrame> {
    if !opcode.carries_value() {
        return Err(CodecError::UnexpectedValue(opcode));
    }
    Ok(value_frame(opcode, value))
}

fn value_frame(opcode: Opcode, value: f32) -> CommandFrame {
    let [b3, b2, b1, b0] = deg_to_rad(value).to_be_bytes();
    CommandFrame::WithValue([opcode.byte(), 0, 0, b3, b2, b1, b0, 0, 0])
}

/// Decode the angle in degrees from a measurement characteristic read.
pub fn decode_angle(telemetry: &[u8]) -> Result<f32> {
    let raw: [u8; TELEMETRY_ANGLE_LEN] = telemetry
        .get(..TELEMETRY_ANGLE_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(CodecError::TelemetryTooShort {
            actual: telemetry.len(),
        })?;
    Ok(rad_to_deg(f32::from_be_bytes(raw)))
}

/// Typed motor command. Angles are degrees, speeds degrees per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    EnableControl,
    SetSpeed(f32),
    PresetPosition(f32),
    RunForward,
    RunReverse,
    MoveTo(f32),
    MoveBy(f32),
    Free,
    Stop,
    StopDoingTaskset,
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::EnableControl => Opcode::EnableControl,
            Command::SetSpeed(_) => Opcode::SetSpeed,
            Command::PresetPosition(_) => Opcode::PresetPosition,
            Command::RunForward => Opcode::RunForward,
            Command::RunReverse => Opcode::RunReverse,
            Command::MoveTo(_) => Opcode::MoveTo,
            Command::MoveBy(_) => Opcode::MoveBy,
            Command::Free => Opcode::Free,
            Command::Stop => Opcode::Stop,
            Command::StopDoingTaskset => Opcode::StopDoingTaskset,
        }
    }

    pub fn value(&self) -> Option<f32> {
        match *self {
            Command::SetSpeed(v)
            | Command::PresetPosition(v)
            | Command::MoveTo(v)
            | Command::MoveBy(v) => Some(v),
            _ => None,
        }
    }

    pub fn encode(&self) -> CommandFrame {
        let opcode = self.opcode();
        match self.value() {
            Some(value) => value_frame(opcode, value),
            None => CommandFrame::Simple([opcode.byte(), 0, 0, 0, 0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_simple_frames() {
        for opcode in Opcode::iter().filter(|op| !op.carries_value()) {
            let frame = encode_simple(opcode).unwrap();
            assert_eq!(frame.as_bytes(), &[opcode.byte(), 0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_opcode_value_mismatch() {
        assert_eq!(
            encode_simple(Opcode::MoveTo),
            Err(CodecError::MissingValue(Opcode::MoveTo))
        );
        assert_eq!(
            encode_with_value(Opcode::Stop, 1.0),
            Err(CodecError::UnexpectedValue(Opcode::Stop))
        );
    }

    #[test]
    fn test_move_to_90_degrees() {
        // 90 * 0.01745329 = 1.5707961 rad -> 0x3FC90FD9
        let frame = encode_with_value(Opcode::MoveTo, 90.0).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0x66, 0x00, 0x00, 0x3F, 0xC9, 0x0F, 0xD9, 0x00, 0x00]
        );
    }

    #[test]
    fn test_value_frame_is_big_endian_radians() {
        let frame = encode_with_value(Opcode::SetSpeed, -45.5).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0x58);
        assert_eq!(&bytes[1..3], &[0, 0]);
        assert_eq!(&bytes[7..9], &[0, 0]);
        let rad = f32::from_be_bytes([bytes[3], bytes[4], bytes[5], bytes[6]]);
        assert_eq!(rad, (-45.5f64 * 0.01745329) as f32);
    }

    #[test]
    fn test_decode_example() {
        // 1.5707964 rad * 57.3
        let deg = decode_angle(&[0x3F, 0xC9, 0x0F, 0xDB]).unwrap();
        assert!((deg - 90.00663).abs() < 1e-3, "got {}", deg);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut telemetry = 1.0f32.to_be_bytes().to_vec();
        telemetry.extend_from_slice(&[0xAA; 8]);
        assert!((decode_angle(&telemetry).unwrap() - 57.3).abs() < 1e-4);
    }

    #[test]
    fn test_decode_short_telemetry() {
        assert_eq!(
            decode_angle(&[0x3F, 0xC9, 0x0F]),
            Err(CodecError::TelemetryTooShort { actual: 3 })
        );
        assert_eq!(
            decode_angle(&[]),
            Err(CodecError::TelemetryTooShort { actual: 0 })
        );
    }

    #[test]
    fn test_encode_then_decode_recovers_angle() {
        // The vendor constants are not exact inverses: 0.01745329 * 57.3 != 1.
        let scale = (0.01745329f64 * 57.3) as f32;
        for value in [-180.0f32, -12.5, 0.0, 1.0, 33.3, 179.0, 720.0] {
            let frame = encode_with_value(Opcode::MoveBy, value).unwrap();
            let decoded = decode_angle(&frame.as_bytes()[3..7]).unwrap();
            assert!(
                (decoded - value * scale).abs() <= value.abs() * 1e-6 + 1e-6,
                "{} decoded as {}",
                value,
                decoded
            );
        }
    }

    #[test]
    fn test_typed_command_matches_raw_encoders() {
        assert_eq!(
            Command::MoveBy(12.0).encode(),
            encode_with_value(Opcode::MoveBy, 12.0).unwrap()
        );
        assert_eq!(
            Command::StopDoingTaskset.encode(),
            encode_simple(Opcode::StopDoingTaskset).unwrap()
        );
        assert_eq!(Command::PresetPosition(0.0).encode().as_bytes().len(), 9);
        assert_eq!(Command::Free.encode().opcode(), 0x6C);
    }
}

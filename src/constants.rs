use uuid::Uuid;

// Command opcodes
pub const CMD_ENABLE_CONTROL: u8 = 0x51;
pub const CMD_SET_SPEED: u8 = 0x58;
pub const CMD_PRESET_POSITION: u8 = 0x5A;
pub const CMD_RUN_FORWARD: u8 = 0x60;
pub const CMD_RUN_REVERSE: u8 = 0x61;
pub const CMD_MOVE_TO: u8 = 0x66;
pub const CMD_MOVE_BY: u8 = 0x68;
pub const CMD_FREE: u8 = 0x6C;
pub const CMD_STOP: u8 = 0x6D;
pub const CMD_STOP_DOING_TASKSET: u8 = 0x82;

// Frame sizes
pub const SIMPLE_FRAME_LEN: usize = 5;
pub const VALUE_FRAME_LEN: usize = 9;
pub const TELEMETRY_ANGLE_LEN: usize = 4;

// Unit conversion. These are the firmware's truncated constants, not exact pi.
pub const DEG_TO_RAD: f64 = 0.01745329;
pub const RAD_TO_DEG: f64 = 57.3;

// KeiganMotor GATT layout
pub const KM_SERVICE_UUID: Uuid = Uuid::from_u128(0xf140ea35_8936_4d35_a0ed_dfcd795baa8c);
pub const MOTOR_TX_UUID: Uuid = Uuid::from_u128(0xf1400001_8936_4d35_a0ed_dfcd795baa8c);
pub const MOTOR_MEASUREMENT_UUID: Uuid = Uuid::from_u128(0xf1400004_8936_4d35_a0ed_dfcd795baa8c);

// Pan/tilt behaviour
pub const ANGLE_SANITY_LIMIT: f32 = 1000.0;
pub const DEFAULT_SPEED_DPS: f32 = 90.0;
pub const DEFAULT_INITIAL_POSITION: f32 = 0.0;
pub const MIN_PAN_ANGLE: i32 = -180;
pub const MAX_PAN_ANGLE: i32 = 180;
pub const MIN_TILT_ANGLE: i32 = -180;
pub const MAX_TILT_ANGLE: i32 = 180;
pub const FINE_STEP: i32 = 1;
pub const COARSE_STEP: i32 = 10;

// Placeholder addresses; replace with your motors' MAC addresses
pub const PAN_MOTOR_ADDRESS: &str = "AA:BB:CC:DD:EE:FF";
pub const TILT_MOTOR_ADDRESS: &str = "AA:BB:CC:DD:EE:00";

pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 5;

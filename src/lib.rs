pub mod channel;
pub mod codec;
pub mod constants;
pub mod controller;
pub mod input;
pub mod memory;
pub mod transport;
mod types;

pub use channel::{ChannelError, MotorChannel};
pub use codec::{CodecError, Command, CommandFrame};
pub use controller::{ControllerState, PanTiltConfig, PanTiltController};
pub use input::{AngleInput, InputEvent};
pub use memory::MemoryConnector;
pub use transport::{BleConnector, Connector, Link, TransportError};
pub use types::{Axis, Opcode};

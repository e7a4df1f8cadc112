// In-process stand-in for a KeiganMotor
//
// Records every frame written to it and answers measurement reads with the
// position implied by the commands it has seen (moveTo / moveBy / preset),
// so the control loop can run without hardware.

use crate::constants::*;
use crate::transport::{Connector, Link, TransportError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MotorState {
    pub frames: Vec<Vec<u8>>,
    pub position_rad: f32,
    pub connected: bool,
    /// Overrides the simulated measurement when set.
    pub telemetry: Option<Vec<u8>>,
}

impl MotorState {
    fn apply(&mut self, frame: &[u8]) {
        self.frames.push(frame.to_vec());
        if frame.len() < VALUE_FRAME_LEN {
            return;
        }
        let value = f32::from_be_bytes([frame[3], frame[4], frame[5], frame[6]]);
        match frame[0] {
            CMD_MOVE_TO | CMD_PRESET_POSITION => self.position_rad = value,
            CMD_MOVE_BY => self.position_rad += value,
            _ => {}
        }
    }

    fn measurement(&self) -> Vec<u8> {
        match &self.telemetry {
            Some(bytes) => bytes.clone(),
            None => {
                let mut bytes = self.position_rad.to_be_bytes().to_vec();
                // velocity and torque fields, unused here
                bytes.extend_from_slice(&[0; 8]);
                bytes
            }
        }
    }
}

pub type SharedMotor = Arc<Mutex<MotorState>>;

/// Hands out [`MemoryLink`]s keyed by identifier. Identifiers marked
/// unreachable fail to connect, like an out-of-range motor.
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    motors: Arc<Mutex<HashMap<String, SharedMotor>>>,
    unreachable: Arc<Mutex<HashSet<String>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, identifier: &str) {
        self.unreachable.lock().insert(identifier.to_string());
    }

    pub fn set_reachable(&self, identifier: &str) {
        self.unreachable.lock().remove(identifier);
    }

    /// Shared state of the motor behind `identifier`, created on first use.
    pub fn motor(&self, identifier: &str) -> SharedMotor {
        Arc::clone(
            self.motors
                .lock()
                .entry(identifier.to_string())
                .or_default(),
        )
    }

    pub fn frames(&self, identifier: &str) -> Vec<Vec<u8>> {
        self.motor(identifier).lock().frames.clone()
    }
}

impl Connector for MemoryConnector {
    type Link = MemoryLink;

    async fn connect(&self, identifier: &str) -> Result<MemoryLink, TransportError> {
        if self.unreachable.lock().contains(identifier) {
            return Err(TransportError::DeviceNotFound {
                address: identifier.to_string(),
            });
        }
        let motor = self.motor(identifier);
        motor.lock().connected = true;
        debug!("Memory link to {} opened", identifier);
        Ok(MemoryLink { motor })
    }
}

pub struct MemoryLink {
    motor: SharedMotor,
}

impl Link for MemoryLink {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let mut motor = self.motor.lock();
        if !motor.connected {
            return Err(TransportError::Closed);
        }
        motor.apply(frame);
        Ok(())
    }

    async fn read_latest(&mut self) -> Result<Vec<u8>, TransportError> {
        let motor = self.motor.lock();
        if !motor.connected {
            return Err(TransportError::Closed);
        }
        Ok(motor.measurement())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.motor.lock().connected = false;
        Ok(())
    }
}

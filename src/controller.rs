use crate::{
    channel::{ChannelError, MotorChannel},
    constants::*,
    transport::{Connector, Link},
    types::Axis,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanTiltConfig {
    pub pan_address: String,
    pub tilt_address: String,
}

impl Default for PanTiltConfig {
    fn default() -> Self {
        PanTiltConfig {
            pan_address: PAN_MOTOR_ADDRESS.to_string(),
            tilt_address: TILT_MOTOR_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Disconnected,
    Operational,
}

/// Two KeiganMotors driven as a pan/tilt rig.
pub struct PanTiltController<L: Link> {
    config: PanTiltConfig,
    pan: MotorChannel<L>,
    tilt: MotorChannel<L>,
    state: ControllerState,
}

impl<L: Link> PanTiltController<L> {
    pub fn new(config: PanTiltConfig) -> Self {
        PanTiltController {
            config,
            pan: MotorChannel::new("PanMotor"),
            tilt: MotorChannel::new("TiltMotor"),
            state: ControllerState::Disconnected,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn channel(&self, axis: Axis) -> &MotorChannel<L> {
        match axis {
            Axis::Pan => &self.pan,
            Axis::Tilt => &self.tilt,
        }
    }

    pub fn channel_mut(&mut self, axis: Axis) -> &mut MotorChannel<L> {
        match axis {
            Axis::Pan => &mut self.pan,
            Axis::Tilt => &mut self.tilt,
        }
    }

    /// Connect both motors, then enable them and set their speed.
    ///
    /// Returns `Ok(false)` if either motor cannot be reached. A motor that did
    /// connect is left connected. `_initial_position` is accepted for API
    /// compatibility and is not sent to the motors.
    pub async fn initial_connect<C>(
        &mut self,
        connector: &C,
        speed_dps: f32,
        _initial_position: f32,
    ) -> Result<bool, ChannelError>
    where
        C: Connector<Link = L>,
    {
        info!("Connecting to KeiganMotor...");
        self.state = ControllerState::Disconnected;

        if !self.pan.connect(connector, &self.config.pan_address).await {
            return Ok(false);
        }
        if !self.tilt.connect(connector, &self.config.tilt_address).await {
            return Ok(false);
        }

        for channel in [&mut self.pan, &mut self.tilt] {
            channel.enable_control().await?;
            channel.set_speed(speed_dps).await?;
        }

        self.state = ControllerState::Operational;
        Ok(true)
    }

    /// Move each axis whose requested angle differs from the last one sent.
    ///
    /// Angles at or above the sanity limit are ignored. Comparison is exact,
    /// so repeating the same request sends nothing.
    pub async fn set_angle(&mut self, pan_deg: f32, tilt_deg: f32) -> Result<(), ChannelError> {
        Self::update_axis(&mut self.pan, pan_deg).await?;
        Self::update_axis(&mut self.tilt, tilt_deg).await
    }

    async fn update_axis(channel: &mut MotorChannel<L>, deg: f32) -> Result<(), ChannelError> {
        let last = channel.last_commanded().unwrap_or(0.0);
        if deg != last && deg < ANGLE_SANITY_LIMIT {
            debug!("{}: {} -> {}", channel.name(), last, deg);
            channel.stop_doing_taskset().await?;
            channel.move_to(deg).await?;
        }
        Ok(())
    }

    pub async fn get_pan_angle(&mut self) -> Result<f32, ChannelError> {
        self.pan.get_angle().await
    }

    pub async fn get_tilt_angle(&mut self) -> Result<f32, ChannelError> {
        self.tilt.get_angle().await
    }

    pub async fn disconnect(&mut self) -> Result<(), ChannelError> {
        self.state = ControllerState::Disconnected;
        self.pan.disconnect().await?;
        self.tilt.disconnect().await
    }
}

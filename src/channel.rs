use crate::codec::{self, CodecError, Command};
use crate::transport::{Connector, Link, TransportError};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Motor {0} is not connected")]
    NotConnected(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// One KeiganMotor reached over a [`Link`].
pub struct MotorChannel<L: Link> {
    name: String,
    link: Option<L>,
    last_commanded: Option<f32>,
}

impl<L: Link> MotorChannel<L> {
    pub fn new(name: impl Into<String>) -> Self {
        MotorChannel {
            name: name.into(),
            link: None,
            last_commanded: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect through `connector`, closing any link already held. A failure
    /// leaves the channel unconnected; there is no retry.
    pub async fn connect<C>(&mut self, connector: &C, identifier: &str) -> bool
    where
        C: Connector<Link = L>,
    {
        if let Some(mut old) = self.link.take() {
            if let Err(e) = old.close().await {
                warn!("{} failed to close previous link: {}", self.name, e);
            }
        }

        match connector.connect(identifier).await {
            Ok(link) => {
                self.link = Some(link);
                info!("{} connected ({})", self.name, identifier);
                true
            }
            Err(e) => {
                warn!("{} is not found ({}): {}", self.name, identifier, e);
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Angle of the last successful `move_to`, if any.
    pub fn last_commanded(&self) -> Option<f32> {
        self.last_commanded
    }

    /// Close the link and drop it. No-op when not connected.
    pub async fn disconnect(&mut self) -> Result<(), ChannelError> {
        if let Some(mut link) = self.link.take() {
            link.close().await?;
            info!("{} disconnected", self.name);
        }
        Ok(())
    }

    pub async fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| ChannelError::NotConnected(self.name.clone()))?;
        let frame = command.encode();
        debug!("{} <- {:?} {:02x?}", self.name, command, frame.as_bytes());
        link.send(frame.as_bytes()).await?;
        Ok(())
    }

    pub async fn enable_control(&mut self) -> Result<(), ChannelError> {
        self.send(Command::EnableControl).await
    }

    pub async fn set_speed(&mut self, dps: f32) -> Result<(), ChannelError> {
        self.send(Command::SetSpeed(dps)).await
    }

    /// Declare the current shaft position to be `deg`.
    pub async fn preset_position(&mut self, deg: f32) -> Result<(), ChannelError> {
        self.send(Command::PresetPosition(deg)).await
    }

    /// Rotate forward until stopped.
    pub async fn run_forward(&mut self) -> Result<(), ChannelError> {
        self.send(Command::RunForward).await
    }

    pub async fn run_reverse(&mut self) -> Result<(), ChannelError> {
        self.send(Command::RunReverse).await
    }

    pub async fn move_to(&mut self, deg: f32) -> Result<(), ChannelError> {
        self.send(Command::MoveTo(deg)).await?;
        self.last_commanded = Some(deg);
        Ok(())
    }

    pub async fn move_by(&mut self, deg: f32) -> Result<(), ChannelError> {
        self.send(Command::MoveBy(deg)).await
    }

    /// De-energize the motor (zero torque).
    pub async fn free(&mut self) -> Result<(), ChannelError> {
        self.send(Command::Free).await
    }

    pub async fn stop(&mut self) -> Result<(), ChannelError> {
        self.send(Command::Stop).await
    }

    pub async fn stop_doing_taskset(&mut self) -> Result<(), ChannelError> {
        self.send(Command::StopDoingTaskset).await
    }

    /// Current shaft angle in degrees.
    pub async fn get_angle(&mut self) -> Result<f32, ChannelError> {
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| ChannelError::NotConnected(self.name.clone()))?;
        let telemetry = link.read_latest().await?;
        Ok(codec::decode_angle(&telemetry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::memory::{MemoryConnector, MemoryLink};

    async fn connected(connector: &MemoryConnector) -> MotorChannel<MemoryLink> {
        let mut channel = MotorChannel::new("Motor");
        assert!(channel.connect(connector, "m").await);
        channel
    }

    #[tokio::test]
    async fn test_commands_before_connect() {
        let mut channel: MotorChannel<MemoryLink> = MotorChannel::new("Motor");
        assert!(!channel.is_connected());
        assert!(matches!(
            channel.enable_control().await,
            Err(ChannelError::NotConnected(_))
        ));
        assert!(matches!(
            channel.get_angle().await,
            Err(ChannelError::NotConnected(_))
        ));
        assert_eq!(channel.last_commanded(), None);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let connector = MemoryConnector::new();
        connector.set_unreachable("m");
        let mut channel = MotorChannel::new("Motor");
        assert!(!channel.connect(&connector, "m").await);
        assert!(!channel.is_connected());
    }

    #[tokio::test]
    async fn test_failed_reconnect_leaves_channel_unconnected() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;
        connector.set_unreachable("gone");

        assert!(!channel.connect(&connector, "gone").await);
        assert!(!channel.is_connected());
        // the previous link was closed, not leaked
        assert!(!connector.motor("m").lock().connected);
        assert!(matches!(channel.stop().await, Err(ChannelError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_reconnect_closes_previous_link() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;

        assert!(channel.connect(&connector, "n").await);
        assert!(channel.is_connected());
        assert!(!connector.motor("m").lock().connected);
        assert!(connector.motor("n").lock().connected);

        channel.stop().await.unwrap();
        assert!(connector.frames("m").is_empty());
        assert_eq!(connector.frames("n").len(), 1);
    }

    #[tokio::test]
    async fn test_frames_on_the_wire() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;

        channel.enable_control().await.unwrap();
        channel.run_forward().await.unwrap();
        channel.run_reverse().await.unwrap();
        channel.free().await.unwrap();
        channel.stop().await.unwrap();
        channel.stop_doing_taskset().await.unwrap();
        channel.move_to(90.0).await.unwrap();

        let opcodes: Vec<u8> = connector.frames("m").iter().map(|f| f[0]).collect();
        assert_eq!(
            opcodes,
            vec![
                CMD_ENABLE_CONTROL,
                CMD_RUN_FORWARD,
                CMD_RUN_REVERSE,
                CMD_FREE,
                CMD_STOP,
                CMD_STOP_DOING_TASKSET,
                CMD_MOVE_TO
            ]
        );
        assert_eq!(
            connector.frames("m").last().unwrap(),
            &vec![0x66, 0x00, 0x00, 0x3F, 0xC9, 0x0F, 0xD9, 0x00, 0x00]
        );
        assert_eq!(channel.last_commanded(), Some(90.0));
    }

    #[tokio::test]
    async fn test_get_angle_follows_moves() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;

        channel.preset_position(0.0).await.unwrap();
        channel.move_by(30.0).await.unwrap();
        channel.move_by(-10.0).await.unwrap();
        let angle = channel.get_angle().await.unwrap();
        assert!((angle - 20.0).abs() < 0.01, "got {}", angle);
        assert_eq!(channel.last_commanded(), None);
    }

    #[tokio::test]
    async fn test_short_telemetry() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;
        connector.motor("m").lock().telemetry = Some(vec![0x3F, 0x80]);
        assert!(matches!(
            channel.get_angle().await,
            Err(ChannelError::Codec(CodecError::TelemetryTooShort { actual: 2 }))
        ));
    }

    #[tokio::test]
    async fn test_disconnect() {
        let connector = MemoryConnector::new();
        let mut channel = connected(&connector).await;
        channel.disconnect().await.unwrap();
        assert!(!channel.is_connected());
        assert!(!connector.motor("m").lock().connected);
        // second call is a no-op
        channel.disconnect().await.unwrap();
        assert!(matches!(channel.stop().await, Err(ChannelError::NotConnected(_))));
    }
}

use clap::Parser;
use keigan_pan_tilt::constants::*;
use keigan_pan_tilt::{
    AngleInput, BleConnector, Connector, InputEvent, MemoryConnector, PanTiltConfig,
    PanTiltController,
};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Drive two KeiganMotors as a pan/tilt rig from the console.
///
/// Keys (one per line): a = switch axis, + / - = 1 degree, ++ / -- = 10 degrees, q = quit
#[derive(Parser, Debug)]
struct Args {
    /// Pan motor MAC address
    #[arg(long, default_value = PAN_MOTOR_ADDRESS)]
    pan: String,

    /// Tilt motor MAC address
    #[arg(long, default_value = TILT_MOTOR_ADDRESS)]
    tilt: String,

    /// Rotation speed in degrees per second
    #[arg(long, default_value_t = DEFAULT_SPEED_DPS)]
    speed: f32,

    /// Accepted for compatibility; not sent to the motors
    #[arg(long, default_value_t = DEFAULT_INITIAL_POSITION, allow_negative_numbers = true)]
    initial_position: f32,

    #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT_SECS)]
    scan_timeout_secs: u64,

    #[arg(long, default_value_t = MIN_PAN_ANGLE, allow_negative_numbers = true)]
    min_pan: i32,

    #[arg(long, default_value_t = MAX_PAN_ANGLE, allow_negative_numbers = true)]
    max_pan: i32,

    #[arg(long, default_value_t = MIN_TILT_ANGLE, allow_negative_numbers = true)]
    min_tilt: i32,

    #[arg(long, default_value_t = MAX_TILT_ANGLE, allow_negative_numbers = true)]
    max_tilt: i32,

    /// Use simulated motors instead of Bluetooth
    #[arg(long)]
    dry_run: bool,
}

async fn run<C: Connector>(connector: C, args: Args) -> Result<(), Box<dyn Error>> {
    let mut controller = PanTiltController::new(PanTiltConfig {
        pan_address: args.pan.clone(),
        tilt_address: args.tilt.clone(),
    });

    if !controller
        .initial_connect(&connector, args.speed, args.initial_position)
        .await?
    {
        return Err("could not connect to both motors".into());
    }

    let mut input = AngleInput::new(args.min_pan..=args.max_pan, args.min_tilt..=args.max_tilt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Controlling {} axis", input.selected());

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "q" {
            break;
        }
        match InputEvent::parse(&line) {
            Some(event) => input.apply(event),
            None => {
                warn!("Unknown key {:?}", line.trim());
                continue;
            }
        }
        info!(
            "Pan angle: {}, Tilt angle: {} deg ({} selected)",
            input.pan(),
            input.tilt(),
            input.selected()
        );

        let (pan, tilt) = input.requested();
        controller.set_angle(pan, tilt).await?;
        info!(
            "pan : {}, tilt : {}",
            controller.get_pan_angle().await? as i32,
            controller.get_tilt_angle().await? as i32
        );
    }

    controller.disconnect().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.dry_run {
        run(MemoryConnector::new(), args).await
    } else {
        let connector =
            BleConnector::with_scan_timeout(Duration::from_secs(args.scan_timeout_secs)).await?;
        run(connector, args).await
    }
}

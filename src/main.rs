use aquabus_rs::payload::decode_reading;
use aquabus_rs::meter::frame::parse_response;
use aquabus_rs::util::hex::decode_hex;
use aquabus_rs::{init_logger, log_info, AquabusError, MeterDeviceHandle};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aquabus-cli")]
#[command(about = "CLI tool for digital water meter communication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the current register from a connected meter
    Read {
        port: String,
        #[arg(short, long, default_value = "1")]
        address: u8,
    },
    /// Decode a captured response frame given as hex
    Decode {
        frame: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), AquabusError> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read { port, address } => {
            let mut handle = MeterDeviceHandle::connect(&port).await?;
            log_info("Connected to meter");
            let reading = handle.read_meter(address).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&reading)
                    .map_err(|e| AquabusError::InvalidParam(e.to_string()))?
            );
        }
        Commands::Decode { frame } => {
            let raw = decode_hex(&frame)
                .map_err(|e| AquabusError::InvalidParam(e.to_string()))?;
            let parsed = parse_response(&raw)?;
            let reading = decode_reading(&parsed)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&reading)
                    .map_err(|e| AquabusError::InvalidParam(e.to_string()))?
            );
        }
    }

    Ok(())
}

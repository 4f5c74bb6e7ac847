//! CSAC frequency steering example
//!
//! Reads a steering value in parts per 10^15 from the command line and
//! applies it as an absolute correction. The value is NOT latched to
//! non-volatile storage.

use chronolink::{Baud, CsacDevice, SerialTransport};

#[tokio::main]
async fn main() -> chronolink::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let path = std::env::var("CSAC_PORT").unwrap_or_else(|_| "/dev/ttyUSB1".to_string());
    let ppt: i32 = std::env::args()
        .nth(1)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let port = SerialTransport::open(&path, Baud::new(CsacDevice::BAUD)?)?;
    let clock = CsacDevice::open(Box::new(port)).await?;

    println!("{}", clock.telemetry_header().await?.text());
    println!("{}", clock.telemetry().await?.text());

    println!("Steering to {ppt} ppt...");
    let reply = clock.steer_absolute(ppt).await?;
    println!("Steer reply: {}", reply.text());

    Ok(())
}

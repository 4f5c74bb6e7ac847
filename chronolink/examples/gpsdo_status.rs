//! GPSDO status example

use chronolink::{Baud, GpsdoDevice, ScpiOps, SerialTransport};

#[tokio::main]
async fn main() -> chronolink::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let path = std::env::var("GPSDO_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let port = SerialTransport::open(&path, Baud::new(GpsdoDevice::BAUD)?)?;
    let gpsdo = GpsdoDevice::open(Box::new(port)).await?;

    let id = gpsdo.idn().await?;
    println!("Connected: {id}");

    println!("Date:      {}", gpsdo.date().await?);
    println!("Time:      {}", gpsdo.time().await?);
    println!("Locked:    {}", gpsdo.locked().await?);
    println!("Health:    {:?}", gpsdo.health().await?);
    println!("Tracking:  {} satellites", gpsdo.tracked_satellites().await?.text());
    println!("EFC:       {} %", gpsdo.efc_percent().await?.text());

    println!("--- full status ---");
    println!("{}", gpsdo.system_status().await?.text());

    Ok(())
}

//! GPS-disciplined oscillator session (Jackson Labs FireFly / GPSTCXO
//! family)

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Mutex;

use chronolink_core::Response;
use chronolink_transport::Transport;
use chronolink_types::{gpstime, Baud, SyncHealth, ValidationError};

use crate::device::{check_range, Instrument, ScpiCapable, SharedLink};
use crate::error::Result;
use crate::link::Link;

/// Rates the oscillator's own serial side accepts (`SYST:COMM:SER:BAUD`)
pub const DEVICE_RATES: [u32; 5] = [9_600, 19_200, 38_400, 57_600, 115_200];

/// 1 PPS source used for synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    /// Internal GPS receiver
    Gps,
    /// External 1 PPS input
    Ext,
    /// Internal receiver when available, fall back to the external input
    Auto,
}

impl SyncSource {
    fn mnemonic(self) -> &'static str {
        match self {
            Self::Gps => "GPS",
            Self::Ext => "EXT",
            Self::Auto => "AUTO",
        }
    }
}

/// Session with a GPS-disciplined oscillator
///
/// SCPI dialect at 115 200 Bd with a 100 ms reply window. The unit also
/// broadcasts NMEA sentences when asked to; those arrive interleaved with
/// command replies and end up in the sentence buffer.
#[derive(Clone)]
pub struct GpsdoDevice {
    link: SharedLink,
}

impl GpsdoDevice {
    /// Initial baud rate for the family
    pub const BAUD: u32 = 115_200;

    /// Initial reply window for the family
    pub const TIMEOUT: Duration = Duration::from_millis(100);

    /// Open a session, applying the family's baud/timeout to the transport
    pub async fn open(transport: Box<dyn Transport>) -> Result<Self> {
        let baud = Baud::new(Self::BAUD)?;
        let link = Link::new(transport, baud, Self::TIMEOUT).await?;

        Ok(Self {
            link: Arc::new(Mutex::new(link)),
        })
    }

    // --- GPS receiver ---

    /// Configuration, position, speed, height and related receiver data
    pub async fn gps(&self) -> Result<Response> {
        self.link.lock().await.query("GPS?").await
    }

    /// Number of tracked satellites
    pub async fn tracked_satellites(&self) -> Result<Response> {
        self.link.lock().await.query("GPS:SAT:TRA:COUN?").await
    }

    /// Number of satellites that should be visible per the almanac
    pub async fn visible_satellites(&self) -> Result<Response> {
        self.link.lock().await.query("GPS:SAT:VIS:COUN?").await
    }

    /// Broadcast GPGGA sentences every `seconds` (0 disables)
    ///
    /// Ignored by the unit during its first minutes of operation.
    pub async fn set_gpgga_rate(&self, seconds: u32) -> Result<()> {
        self.set_broadcast_rate("GPS:GPGGA", seconds).await
    }

    /// Broadcast modified GPGGA sentences carrying lock state and health
    pub async fn set_ggast_rate(&self, seconds: u32) -> Result<()> {
        self.set_broadcast_rate("GPS:GGAST", seconds).await
    }

    /// Broadcast GPRMC sentences every `seconds` (0 disables)
    pub async fn set_gprmc_rate(&self, seconds: u32) -> Result<()> {
        self.set_broadcast_rate("GPS:GPRMC", seconds).await
    }

    /// Broadcast X/Y/Z speed sentences with accuracy estimates
    pub async fn set_xyzsp_rate(&self, seconds: u32) -> Result<()> {
        self.set_broadcast_rate("GPS:XYZSP", seconds).await
    }

    async fn set_broadcast_rate(&self, command: &str, seconds: u32) -> Result<()> {
        check_range(0u32, 255, seconds)?;
        self.link
            .lock()
            .await
            .exec(&format!("{command} {seconds}"))
            .await
    }

    // --- Time ---

    /// Date, UTC time, timezone, and GPS time shift in one report
    pub async fn ptime(&self) -> Result<Response> {
        self.link.lock().await.query("PTIME?").await
    }

    /// Calendar date (UTC)
    pub async fn date(&self) -> Result<NaiveDate> {
        let response = self.link.lock().await.query("PTIM:DATE?").await?;
        Ok(gpstime::parse_date(response.first().unwrap_or_default())?)
    }

    /// Time of day (UTC)
    pub async fn time(&self) -> Result<NaiveTime> {
        let response = self.link.lock().await.query("PTIM:TIME:STR?").await?;
        Ok(gpstime::parse_time(response.first().unwrap_or_default())?)
    }

    /// Shift between oscillator time and GPS time, 1E-10 s precision
    pub async fn time_interval(&self) -> Result<Response> {
        self.link.lock().await.query("PTIM:TINT?").await
    }

    // --- Synchronization ---

    /// Full synchronization status report
    pub async fn sync_status(&self) -> Result<Response> {
        self.link.lock().await.query("SYNC?").await
    }

    /// Select the 1 PPS source used for synchronization
    pub async fn set_sync_source(&self, source: SyncSource) -> Result<()> {
        self.link
            .lock()
            .await
            .exec(&format!("SYNC:SOUR:MODE {}", source.mnemonic()))
            .await
    }

    /// The synchronization source currently in use
    pub async fn sync_source_state(&self) -> Result<Response> {
        self.link.lock().await.query("SYNC:SOUR:STATE?").await
    }

    /// Length of the most recent holdover
    pub async fn holdover_duration(&self) -> Result<Response> {
        self.link.lock().await.query("SYNC:HOLD:DUR?").await
    }

    /// Enter holdover immediately
    pub async fn start_holdover(&self) -> Result<()> {
        self.link.lock().await.exec("SYNC:HOLD:INIT").await
    }

    /// Terminate a manual holdover started with [`start_holdover`]
    ///
    /// [`start_holdover`]: Self::start_holdover
    pub async fn recover_holdover(&self) -> Result<()> {
        self.link.lock().await.exec("SYNC:HOLD:REC:INIT").await
    }

    /// Synchronize to the reference 1 PPS now; ignored in holdover
    pub async fn sync_now(&self) -> Result<()> {
        self.link.lock().await.exec("SYNC:IMME").await
    }

    /// Shift between oscillator time and GPS time
    pub async fn time_shift(&self) -> Result<Response> {
        self.link.lock().await.query("SYNC:TINT?").await
    }

    /// Frequency error estimate over a 1000 s interval
    ///
    /// Values below 1E-12 are noise.
    pub async fn frequency_error(&self) -> Result<Response> {
        self.link.lock().await.query("SYNC:FEE?").await
    }

    /// Whether the PLL controlling the oscillator is locked
    pub async fn locked(&self) -> Result<bool> {
        let response = self.link.lock().await.query("SYNC:LOCK?").await?;
        Ok(response.first().map(str::trim) == Some("1"))
    }

    /// Health summary of the disciplining system
    pub async fn health(&self) -> Result<SyncHealth> {
        let response = self.link.lock().await.query("SYNC:HEALTH?").await?;
        Ok(SyncHealth::parse(response.first().unwrap_or_default())?)
    }

    // --- Diagnostics ---

    /// Electronic frequency control value in percent
    pub async fn efc_percent(&self) -> Result<Response> {
        self.link.lock().await.query("DIAG:ROSC:EFC:REL?").await
    }

    /// Electronic frequency control value in volts
    pub async fn efc_volts(&self) -> Result<Response> {
        self.link.lock().await.query("DIAG:ROSC:EFC:ABS?").await
    }

    /// Formatted system status screen
    pub async fn system_status(&self) -> Result<Response> {
        self.link.lock().await.query("SYST:STAT?").await
    }

    // --- Serial configuration ---

    /// Whether command echo is enabled on RS-232
    pub async fn echo_enabled(&self) -> Result<Response> {
        self.link.lock().await.query("SYST:COMM:SER:ECHO?").await
    }

    /// Enable or disable command echo on RS-232
    ///
    /// Echo should stay enabled; it is what makes echo-matched completion
    /// possible.
    pub async fn set_echo(&self, enabled: bool) -> Result<()> {
        self.link
            .lock()
            .await
            .exec(&format!(
                "SYST:COMM:SER:ECHO {}",
                if enabled { "ON" } else { "OFF" }
            ))
            .await
    }

    /// Whether the `scpi>` prompt is enabled
    pub async fn prompt_enabled(&self) -> Result<Response> {
        self.link.lock().await.query("SYST:COMM:SER:PRO?").await
    }

    /// Enable or disable the `scpi>` prompt
    pub async fn set_prompt(&self, enabled: bool) -> Result<()> {
        self.link
            .lock()
            .await
            .exec(&format!(
                "SYST:COMM:SER:PRO {}",
                if enabled { "ON" } else { "OFF" }
            ))
            .await
    }

    /// The unit's own serial baud setting
    pub async fn device_baud(&self) -> Result<Response> {
        self.link.lock().await.query("SYST:COMM:SER:BAUD?").await
    }

    /// Change the unit's serial baud setting
    ///
    /// The rate must be one of [`DEVICE_RATES`]. Only the instrument side
    /// changes; call [`set_baud`] afterwards or communication is lost.
    ///
    /// [`set_baud`]: Self::set_baud
    pub async fn set_device_baud(&self, rate: u32) -> Result<()> {
        if !DEVICE_RATES.contains(&rate) {
            return Err(ValidationError::UnsupportedBaud(rate).into());
        }

        self.link
            .lock()
            .await
            .exec(&format!("SYST:COMM:SER:BAUD {rate}"))
            .await
    }

    /// Re-tune the local transport after [`set_device_baud`]
    ///
    /// [`set_device_baud`]: Self::set_device_baud
    pub async fn set_baud(&self, baud: Baud) -> Result<()> {
        self.link.lock().await.set_baud(baud).await
    }

    // --- Servo loop ---

    /// Parameters currently in use by the servo loop
    pub async fn servo(&self) -> Result<Response> {
        self.link.lock().await.query("SERV?").await
    }

    /// Coarse DAC controlling the EFC, range [0, 255]
    ///
    /// Normally left to the unit itself.
    pub async fn set_coarse_dac(&self, value: u32) -> Result<()> {
        check_range(0u32, 255, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:COARSD {value}"))
            .await
    }

    /// Proportional coefficient of the PID loop, range [0.0, 500.0]
    ///
    /// Larger values tighten the loop at the expense of noise while
    /// locked; typical values are 0.7 (double oven) to 6.0 (single oven).
    pub async fn set_proportional(&self, value: f64) -> Result<()> {
        check_range(0.0, 500.0, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:EFCS {value}"))
            .await
    }

    /// Low-pass filter effectiveness of the DAC, range [0.0, 4000.0],
    /// typically within [2.0, 50.0]
    pub async fn set_dac_filter(&self, value: f64) -> Result<()> {
        check_range(0.0, 4000.0, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:EFCD {value}"))
            .await
    }

    /// Temperature compensation coefficient, range [-4000.0, 4000.0]
    pub async fn set_temp_compensation(&self, value: f64) -> Result<()> {
        check_range(-4000.0, 4000.0, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:TEMPCO {value}"))
            .await
    }

    /// OCXO aging coefficient, range [-10.0, 10.0]
    pub async fn set_aging(&self, value: f64) -> Result<()> {
        check_range(-10.0, 10.0, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:AGING {value}"))
            .await
    }

    /// Integral (phase) coefficient of the PID loop, range
    /// [-100.0, 100.0], typically within [10.0, 30.0]
    pub async fn set_phase(&self, value: f64) -> Result<()> {
        check_range(-100.0, 100.0, value)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:PHASECO {value}"))
            .await
    }

    /// Offset to UTC in nanoseconds
    pub async fn pps_offset(&self) -> Result<Response> {
        self.link.lock().await.query("SERV:1PPS?").await
    }

    /// Set the offset to UTC, applied in 16.7 ns increments
    pub async fn set_pps_offset(&self, offset: i32) -> Result<()> {
        self.link
            .lock()
            .await
            .exec(&format!("SERV:1PPS {offset}"))
            .await
    }

    /// Emit a debug trace every `seconds` (0 disables)
    pub async fn set_trace_rate(&self, seconds: u32) -> Result<()> {
        check_range(0u32, 255, seconds)?;
        self.link
            .lock()
            .await
            .exec(&format!("SERV:TRAC {seconds}"))
            .await
    }

    /// Unsolicited NMEA sentences collected while commands were serviced
    pub async fn drain_sentences(&self) -> Vec<String> {
        self.link.lock().await.drain_sentences()
    }
}

impl Instrument for GpsdoDevice {
    fn link(&self) -> &SharedLink {
        &self.link
    }
}

impl ScpiCapable for GpsdoDevice {}

use crate::acquisition::{nmea, GpsSource};
use anyhow::Context;
use rakecore::GpsFix;
use serialport::{ClearBuffer, SerialPort};
use std::io::Read;
use std::time::{Duration, Instant};

/// Budget spent listening for a GGA sentence each tick; receivers emit one
/// per second, so this catches most of them without starving the loop.
const READ_BUDGET: Duration = Duration::from_millis(900);
const SERIAL_TIMEOUT: Duration = Duration::from_millis(200);
const MAX_PENDING: usize = 4096;

/// NMEA receiver on the Pi's UART. Errors after open degrade to "no fix
/// this tick"; only the initial open is surfaced to the caller.
pub struct SerialGps {
    port: Box<dyn SerialPort>,
    pending: String,
}

impl SerialGps {
    pub fn open(path: &str, baud: u32) -> anyhow::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(SERIAL_TIMEOUT)
            .open()
            .with_context(|| format!("opening GPS serial port {}", path))?;
        // Drop whatever accumulated while nobody was listening.
        let _ = port.clear(ClearBuffer::Input);
        log::info!("GPS listening on {} at {} baud", path, baud);
        Ok(Self {
            port,
            pending: String::new(),
        })
    }
}

impl GpsSource for SerialGps {
    fn read_fix(&mut self) -> Option<GpsFix> {
        let deadline = Instant::now() + READ_BUDGET;
        let mut chunk = [0u8; 512];

        while Instant::now() < deadline {
            match self.port.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    self.pending
                        .push_str(&String::from_utf8_lossy(&chunk[..n]));
                    if self.pending.len() > MAX_PENDING {
                        // Garbage stream; keep only the tail.
                        let cut = self.pending.len() - MAX_PENDING / 2;
                        self.pending.drain(..cut);
                    }
                    if let Some(fix) = next_fix(&mut self.pending) {
                        return Some(fix);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => {
                    log::warn!("GPS read error, retrying next tick: {}", e);
                    return None;
                }
            }
        }
        None
    }
}

/// Pops complete lines off the accumulated stream, returning the first
/// valid GGA fix. Partial trailing lines stay buffered for the next read.
fn next_fix(pending: &mut String) -> Option<GpsFix> {
    while let Some(newline) = pending.find('\n') {
        let line: String = pending.drain(..=newline).collect();
        if !line.contains("GGA") {
            continue;
        }
        if let Some(fix) = nmea::parse_gga(&line) {
            return Some(GpsFix {
                latitude: fix.latitude,
                longitude: fix.longitude,
                altitude: fix.altitude,
            });
        }
    }
    None
}

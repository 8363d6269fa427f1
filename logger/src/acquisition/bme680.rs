use crate::acquisition::SensorSource;
use anyhow::{anyhow, Context};
use bme680::{
    Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder,
};
use linux_embedded_hal::{Delay, I2cdev};
use rakecore::SensorSample;
use std::time::{Duration, Instant};

/// BME680 on the Pi's I2C bus. Probes 0x77 first (the common breakout
/// wiring), then 0x76. An unreachable bus at startup is fatal so the
/// service supervisor can apply its restart policy; a failed read after
/// that is transient.
pub struct Bme680Sensor {
    device: Bme680<I2cdev, Delay>,
    delay: Delay,
    started: Instant,
    warmup: Duration,
}

impl Bme680Sensor {
    pub fn open(bus: &str, warmup: Duration) -> anyhow::Result<Self> {
        let mut delay = Delay {};
        let mut last_error = String::new();

        for address in [I2CAddress::Secondary, I2CAddress::Primary] {
            let i2c = I2cdev::new(bus).with_context(|| format!("opening I2C bus {}", bus))?;
            match Bme680::init(i2c, &mut delay, address) {
                Ok(mut device) => {
                    let settings = SettingsBuilder::new()
                        .with_humidity_oversampling(OversamplingSetting::OS2x)
                        .with_pressure_oversampling(OversamplingSetting::OS4x)
                        .with_temperature_oversampling(OversamplingSetting::OS8x)
                        .with_temperature_filter(IIRFilterSize::Size3)
                        .with_gas_measurement(Duration::from_millis(150), 320, 25)
                        .with_run_gas(true)
                        .build();
                    device
                        .set_sensor_settings(&mut delay, settings)
                        .map_err(|e| anyhow!("configuring BME680: {:?}", e))?;
                    log::info!("BME680 found at {:?} on {}", address, bus);
                    return Ok(Self {
                        device,
                        delay,
                        started: Instant::now(),
                        warmup,
                    });
                }
                Err(e) => last_error = format!("{:?}", e),
            }
        }

        Err(anyhow!(
            "no BME680 at 0x77 or 0x76 on {}: {}",
            bus,
            last_error
        ))
    }
}

impl SensorSource for Bme680Sensor {
    fn sample(&mut self) -> anyhow::Result<SensorSample> {
        self.device
            .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
            .map_err(|e| anyhow!("triggering BME680 measurement: {:?}", e))?;
        let (data, _condition) = self
            .device
            .get_sensor_data(&mut self.delay)
            .map_err(|e| anyhow!("reading BME680: {:?}", e))?;

        // The heater needs several minutes before resistance is meaningful;
        // until then the gas field stays unknown rather than misleading.
        let gas = if self.started.elapsed() >= self.warmup {
            Some(data.gas_resistance_ohm() as f32)
        } else {
            None
        };

        Ok(SensorSample {
            temperature: Some(data.temperature_celsius()),
            humidity: Some(data.humidity_percent()),
            pressure: Some(data.pressure_hpa()),
            gas,
        })
    }
}

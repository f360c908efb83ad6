//! Bus and polling settings, with the MCP3903 defaults baked in.

use std::path::Path;
use std::time::Duration;

use mcp3903::WordSize;
use serde::Deserialize;

use crate::error::LoadError;

/// Upper bound accepted for the SPI clock.
///
/// The 1 - 5 MHz range is the MCP3903's AMCLK window with the BOOST bits off, not a limit of
/// the serial interface itself. Board wiring commonly feeds AMCLK from the same source, so SCLK
/// is held to that window as a conservative cap.
pub const MAX_FREQUENCY_HZ: u32 = 5_000_000;

/// SPI clock polarity/phase. The MCP3903 only supports (0, 0) and (1, 1).
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8")]
pub enum ClockMode {
    Mode0,
    Mode3,
}

impl ClockMode {
    pub fn number(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode3 => 3,
        }
    }
}

impl TryFrom<u8> for ClockMode {
    type Error = String;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Self::Mode0),
            3 => Ok(Self::Mode3),
            other => Err(format!("clock mode {other} is not supported, use 0 or 3")),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    #[default]
    MsbFirst,
}

/// SPI bus parameters, applied once at startup.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    pub bus_id: u8,
    pub chip_select: u8,
    pub frequency_hz: u32,
    pub word_bits: u8,
    pub clock_mode: ClockMode,
    pub bit_order: BitOrder,
    /// Set the slave select active low. `false` leaves the bus at its current polarity
    /// (active low on the Pi) and only changes the level used for `cs_gpio`.
    pub cs_active_low: bool,
    /// GPIO line to drive as chip select instead of the controller's own slave select.
    pub cs_gpio: Option<u8>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bus_id: 1,
            chip_select: 0,
            frequency_hz: 4_000_000,
            word_bits: 24,
            clock_mode: ClockMode::Mode3,
            bit_order: BitOrder::MsbFirst,
            cs_active_low: true,
            cs_gpio: None,
        }
    }
}

impl BusConfig {
    /// Word size for sample reads.
    pub fn word_size(&self) -> Result<WordSize, LoadError> {
        WordSize::try_from(self.word_bits).map_err(|bits| {
            LoadError::Invalid(format!("word size of {bits} bits, use 8, 16 or 24"))
        })
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        self.word_size()?;

        if self.frequency_hz == 0 || self.frequency_hz > MAX_FREQUENCY_HZ {
            return Err(LoadError::Invalid(format!(
                "frequency of {} Hz, use 1 to {MAX_FREQUENCY_HZ} Hz",
                self.frequency_hz
            )));
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    #[serde(rename = "interval_ms", with = "millis")]
    pub interval: Duration,
    pub print_samples: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            print_samples: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ProbeConfig {
    pub bus: BusConfig,
    pub poll: PollConfig,
}

impl ProbeConfig {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();

        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&source).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.bus.validate()?;

        Ok(config)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mcp3903_wiring() {
        let config = ProbeConfig::default();

        assert_eq!(config.bus.bus_id, 1);
        assert_eq!(config.bus.chip_select, 0);
        assert_eq!(config.bus.frequency_hz, 4_000_000);
        assert_eq!(config.bus.word_bits, 24);
        assert_eq!(config.bus.clock_mode, ClockMode::Mode3);
        assert!(config.bus.cs_active_low);
        assert_eq!(config.poll.interval, Duration::from_millis(500));
        assert!(!config.poll.print_samples);
        assert!(config.bus.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ProbeConfig::from_toml(
            r#"
            [bus]
            bus_id = 0
            clock_mode = 0

            [poll]
            interval_ms = 250
            print_samples = true
            "#,
        )
        .unwrap();

        assert_eq!(config.bus.bus_id, 0);
        assert_eq!(config.bus.clock_mode, ClockMode::Mode0);
        assert_eq!(config.bus.word_bits, 24);
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert!(config.poll.print_samples);
    }

    #[test]
    fn unsupported_clock_mode_is_rejected() {
        let result = ProbeConfig::from_toml("[bus]\nclock_mode = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_word_size_and_frequency() {
        let mut bus = BusConfig::default();
        bus.word_bits = 12;
        assert!(matches!(bus.validate(), Err(LoadError::Invalid(_))));

        let mut bus = BusConfig::default();
        bus.frequency_hz = 20_000_000;
        assert!(matches!(bus.validate(), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = ProbeConfig::from_file("/nonexistent/probe.toml").unwrap_err();
        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/probe.toml"));
    }
}

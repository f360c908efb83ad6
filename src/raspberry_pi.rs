//! [`SpiTransport`] over the Raspberry Pi's `spidev` devices via `rppal`.

use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{self, Bus, Mode, Polarity, SlaveSelect, Spi};
use thiserror::Error;

use crate::config::{BitOrder, BusConfig, ClockMode};
use crate::transport::SpiTransport;

#[derive(Debug, Error)]
pub enum RppalError {
    #[error(transparent)]
    Spi(#[from] spi::Error),
    #[error(transparent)]
    Gpio(#[from] rppal::gpio::Error),
    #[error("no SPI bus {0}")]
    UnknownBus(u8),
    #[error("no chip select {0}")]
    UnknownChipSelect(u8),
    #[error("bus reports unsupported clock mode {0:?}")]
    UnsupportedMode(Mode),
    #[error("chip select is disabled")]
    ChipSelectDisabled,
}

/// Chip select handling. With a GPIO line the line is held at its active level while
/// enabled, otherwise the controller's own slave select toggles per transfer and
/// transfers are refused while disabled.
///
/// The controller's slave select is only ever switched to active low. Without that call it
/// keeps the kernel default, which is also active low.
pub struct RppalTransport {
    spi: Spi,
    cs_pin: Option<OutputPin>,
    cs_active_low: bool,
    cs_enabled: bool,
}

impl RppalTransport {
    pub fn open(config: &BusConfig) -> Result<Self, RppalError> {
        let bus = match config.bus_id {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            3 => Bus::Spi3,
            4 => Bus::Spi4,
            5 => Bus::Spi5,
            6 => Bus::Spi6,
            other => return Err(RppalError::UnknownBus(other)),
        };

        let slave_select = match config.chip_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(RppalError::UnknownChipSelect(other)),
        };

        let spi = Spi::new(bus, slave_select, config.frequency_hz, to_mode(config.clock_mode))?;

        let cs_pin = match config.cs_gpio {
            Some(pin) => {
                let mut pin = Gpio::new()?.get(pin)?.into_output();
                // Start released
                if config.cs_active_low {
                    pin.set_high();
                } else {
                    pin.set_low();
                }
                Some(pin)
            }
            None => None,
        };

        Ok(Self {
            spi,
            cs_pin,
            cs_active_low: config.cs_active_low,
            cs_enabled: false,
        })
    }

    fn drive_cs(&mut self, active: bool) {
        if let Some(pin) = self.cs_pin.as_mut() {
            if active == self.cs_active_low {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }

        self.cs_enabled = active;
    }

    fn check_cs(&self) -> Result<(), RppalError> {
        if self.cs_enabled {
            Ok(())
        } else {
            Err(RppalError::ChipSelectDisabled)
        }
    }
}

fn to_mode(mode: ClockMode) -> Mode {
    match mode {
        ClockMode::Mode0 => Mode::Mode0,
        ClockMode::Mode3 => Mode::Mode3,
    }
}

impl SpiTransport for RppalTransport {
    type Error = RppalError;

    fn set_max_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        Ok(self.spi.set_clock_speed(hz)?)
    }

    fn set_bits_per_word(&mut self, bits: u8) -> Result<(), Self::Error> {
        Ok(self.spi.set_bits_per_word(bits)?)
    }

    fn set_clock_mode(&mut self, mode: ClockMode) -> Result<(), Self::Error> {
        Ok(self.spi.set_mode(to_mode(mode))?)
    }

    fn set_cs_active_low(&mut self) -> Result<(), Self::Error> {
        self.spi.set_ss_polarity(Polarity::ActiveLow)?;
        self.cs_active_low = true;
        Ok(())
    }

    fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Self::Error> {
        let order = match order {
            BitOrder::MsbFirst => spi::BitOrder::MsbFirst,
        };

        Ok(self.spi.set_bit_order(order)?)
    }

    fn enable_cs(&mut self) -> Result<(), Self::Error> {
        self.drive_cs(true);
        Ok(())
    }

    fn disable_cs(&mut self) -> Result<(), Self::Error> {
        self.drive_cs(false);
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.check_cs()?;
        Ok(self.spi.read(buffer)?)
    }

    fn write(&mut self, buffer: &[u8]) -> Result<usize, Self::Error> {
        self.check_cs()?;
        Ok(self.spi.write(buffer)?)
    }

    fn close(mut self) {
        if self.cs_enabled {
            self.drive_cs(false);
        }
        // Dropping the handles closes /dev/spidevX.Y and releases the GPIO line
    }

    fn mode(&self) -> Result<ClockMode, Self::Error> {
        match self.spi.mode()? {
            Mode::Mode0 => Ok(ClockMode::Mode0),
            Mode::Mode3 => Ok(ClockMode::Mode3),
            other => Err(RppalError::UnsupportedMode(other)),
        }
    }

    fn max_frequency(&self) -> Result<u32, Self::Error> {
        Ok(self.spi.clock_speed()?)
    }

    fn bits_per_word(&self) -> Result<u8, Self::Error> {
        Ok(self.spi.bits_per_word()?)
    }
}

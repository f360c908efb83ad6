use crate::config::{BitOrder, ClockMode};

/// An opened SPI device handle.
///
/// Setters change the bus configuration of the handle, reads and writes move one frame
/// each. Dropping the handle through [`SpiTransport::close`] releases the device.
pub trait SpiTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_max_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;
    fn set_bits_per_word(&mut self, bits: u8) -> Result<(), Self::Error>;
    fn set_clock_mode(&mut self, mode: ClockMode) -> Result<(), Self::Error>;
    fn set_cs_active_low(&mut self) -> Result<(), Self::Error>;
    fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Self::Error>;

    fn enable_cs(&mut self) -> Result<(), Self::Error>;
    fn disable_cs(&mut self) -> Result<(), Self::Error>;

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
    fn write(&mut self, buffer: &[u8]) -> Result<usize, Self::Error>;

    fn close(self);

    fn mode(&self) -> Result<ClockMode, Self::Error>;
    fn max_frequency(&self) -> Result<u32, Self::Error>;
    fn bits_per_word(&self) -> Result<u8, Self::Error>;
}

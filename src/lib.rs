//! Drive an MCP3903 ADC over SPI: configure the bus, put the chip into continuous
//! conversion and poll samples until interrupted.

pub mod config;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod transport;

#[cfg(feature = "raspberry_pi")]
pub mod raspberry_pi;

pub use config::{BitOrder, BusConfig, ClockMode, PollConfig, ProbeConfig};
pub use error::{ConfigError, ConfigStage, ControlError, LifecycleError, LoadError, ReadError};
pub use lifecycle::{install_signal_handler, Controller, RunFlag, RunSummary, State};
pub use transport::SpiTransport;

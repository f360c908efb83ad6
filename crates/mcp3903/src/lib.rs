//! Register-level facts about the Microchip MCP3903 six channel ADC.
//!
//! The bus itself is not handled here, see the `mcp3903-probe` crate for the SPI side.

#![no_std]
#![forbid(unsafe_code)]

pub mod control;
pub mod sample;

pub use control::{build_control_byte, Access, ControlByte, CONTINUOUS_REGISTER, DEVICE_ADDRESS};
pub use sample::{decode_sample, WordSize};

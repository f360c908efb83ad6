//! The control byte that opens every MCP3903 transaction.
//!
//! Layout, least significant bit first:
//!
//! | bits | field            |
//! |------|------------------|
//! | 0-1  | device address   |
//! | 2-6  | register address |
//! | 7    | read/write       |

const ADDRESS_SHIFT: u8 = 0;
const ADDRESS_MASK: u8 = 0b0000_0011;

const REGISTER_SHIFT: u8 = 2;
const REGISTER_MASK: u8 = 0b0111_1100;

const ACCESS_SHIFT: u8 = 7;
const ACCESS_MASK: u8 = 0b1000_0000;

/// Device address pattern of the chip on the bus.
pub const DEVICE_ADDRESS: u8 = 0b01;

/// Register selecting continuous conversion.
pub const CONTINUOUS_REGISTER: u8 = 0b0_0001;

/// Direction of a register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Access {
    Read = 0,
    Write = 1,
}

/// A single control byte. Only the three named fields can be set, every other bit stays 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlByte(u8);

impl ControlByte {
    /// Builds a control byte. Values wider than their field are truncated to the field width.
    pub const fn new(address: u8, register: u8, access: Access) -> Self {
        let byte = ((address << ADDRESS_SHIFT) & ADDRESS_MASK)
            | ((register << REGISTER_SHIFT) & REGISTER_MASK)
            | (((access as u8) << ACCESS_SHIFT) & ACCESS_MASK);

        Self(byte)
    }

    /// Write access to the continuous conversion register.
    pub const fn continuous_write() -> Self {
        Self::new(DEVICE_ADDRESS, CONTINUOUS_REGISTER, Access::Write)
    }

    /// Device address field, bits 0-1.
    pub const fn address(self) -> u8 {
        (self.0 & ADDRESS_MASK) >> ADDRESS_SHIFT
    }

    /// Register address field, bits 2-6.
    pub const fn register(self) -> u8 {
        (self.0 & REGISTER_MASK) >> REGISTER_SHIFT
    }

    /// Read/write field, bit 7.
    pub const fn access(self) -> Access {
        if self.0 & ACCESS_MASK == 0 {
            Access::Read
        } else {
            Access::Write
        }
    }

    /// The raw byte as sent on the wire.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl From<ControlByte> for u8 {
    fn from(byte: ControlByte) -> Self {
        byte.0
    }
}

impl core::fmt::Binary for ControlByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Binary::fmt(&self.0, f)
    }
}

/// The byte written before polling starts: continuous conversion, write access.
pub const fn build_control_byte() -> u8 {
    ControlByte::continuous_write().bits()
}

use std::path::PathBuf;

use thiserror::Error;

/// Bus setting that was being applied when configuration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStage {
    MaxFrequency,
    BitsPerWord,
    ClockMode,
    ChipSelectPolarity,
    BitOrder,
}

impl std::fmt::Display for ConfigStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MaxFrequency => "max frequency",
            Self::BitsPerWord => "bits per word",
            Self::ClockMode => "clock mode",
            Self::ChipSelectPolarity => "chip select polarity",
            Self::BitOrder => "bit order",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("could not set {stage}")]
pub struct ConfigError<E: std::error::Error + 'static> {
    pub stage: ConfigStage,
    #[source]
    pub source: E,
}

/// Failure while sending the control byte with a temporary 8 bit word size.
#[derive(Debug, Error)]
pub enum ControlError<E: std::error::Error + 'static> {
    #[error("could not narrow the word size to 8 bits")]
    Narrow(#[source] E),
    #[error("could not write the control byte")]
    Write(#[source] E),
    #[error("could not restore the word size to {bits} bits")]
    Restore {
        bits: u8,
        #[source]
        source: E,
    },
}

/// Failure to read one sample word.
#[derive(Debug, Error)]
pub enum ReadError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Transport(E),
    #[error("short read, got {got} of {expected} bytes")]
    Short { expected: usize, got: usize },
}

/// Errors that end a run. Everything else is logged and tolerated.
#[derive(Debug, Error)]
pub enum LifecycleError<E: std::error::Error + 'static> {
    #[error("could not open SPI bus {bus} chip select {chip_select}")]
    Open {
        bus: u8,
        chip_select: u8,
        #[source]
        source: E,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

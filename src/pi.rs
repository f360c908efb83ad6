//! Poll an MCP3903 on a Raspberry Pi until Ctrl+C.
//!
//! Requires an SPI kernel driver exposing `/dev/spidevX.Y`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use mcp3903_probe::raspberry_pi::RppalTransport;
use mcp3903_probe::{install_signal_handler, ClockMode, Controller, ProbeConfig};

#[derive(Parser, Debug)]
#[command(about = "Read an MCP3903 ADC over SPI until interrupted")]
struct Args {
    /// TOML file with `[bus]` and `[poll]` tables
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    bus: Option<u8>,

    #[arg(long)]
    chip_select: Option<u8>,

    /// SPI clock frequency in Hz
    #[arg(long)]
    frequency: Option<u32>,

    /// Bits per word for sample reads (8, 16 or 24)
    #[arg(long)]
    word_bits: Option<u8>,

    /// SPI clock mode (0 or 3)
    #[arg(long)]
    clock_mode: Option<u8>,

    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log every sample read
    #[arg(long)]
    print_samples: bool,

    /// Drive this GPIO line as chip select
    #[arg(long)]
    cs_gpio: Option<u8>,
}

impl Args {
    fn into_config(self) -> Result<ProbeConfig, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::from_file(path)?,
            None => ProbeConfig::default(),
        };

        let bus = &mut config.bus;

        if let Some(id) = self.bus {
            bus.bus_id = id;
        }
        if let Some(chip_select) = self.chip_select {
            bus.chip_select = chip_select;
        }
        if let Some(hz) = self.frequency {
            bus.frequency_hz = hz;
        }
        if let Some(bits) = self.word_bits {
            bus.word_bits = bits;
        }
        if let Some(mode) = self.clock_mode {
            bus.clock_mode = ClockMode::try_from(mode).map_err(anyhow::Error::msg)?;
        }
        if self.cs_gpio.is_some() {
            bus.cs_gpio = self.cs_gpio;
        }
        if let Some(ms) = self.interval_ms {
            config.poll.interval = Duration::from_millis(ms);
        }
        if self.print_samples {
            config.poll.print_samples = true;
        }

        Ok(config)
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;

    let mut controller = Controller::new(config)?;

    let summary = controller.run(RppalTransport::open, install_signal_handler)?;

    info!(
        "Read {} samples ({} failed reads, {} warnings)",
        summary.samples, summary.read_failures, summary.warnings
    );

    Ok(())
}

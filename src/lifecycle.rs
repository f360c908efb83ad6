//! Open, configure, poll until told to stop, then release the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;

use log::{debug, error, info, warn};
use mcp3903::{ControlByte, WordSize};
use simple_signal::Signal;

use crate::config::{BusConfig, ProbeConfig};
use crate::device;
use crate::error::{LifecycleError, LoadError};
use crate::transport::SpiTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Opening,
    Configuring,
    ChipSelectEnabled,
    Polling,
    ChipSelectDisabled,
    Closed,
    Failed,
}

/// Process wide run flag. Starts out running, [`RunFlag::stop`] clears it for good.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl Default for RunFlag {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Stop `flag` on SIGINT or SIGTERM.
pub fn install_signal_handler(flag: RunFlag) {
    simple_signal::set_handler(&[Signal::Int, Signal::Term], move |_signals| {
        flag.stop();
    });
}

/// What happened during a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: u64,
    pub read_failures: u64,
    pub last_sample: Option<i32>,
    /// Tolerated failures outside of reads: configuration, chip select, control byte.
    pub warnings: u32,
}

pub struct Controller {
    config: ProbeConfig,
    word: WordSize,
    flag: RunFlag,
    transitions: Vec<State>,
}

impl Controller {
    pub fn new(config: ProbeConfig) -> Result<Self, LoadError> {
        config.bus.validate()?;
        let word = config.bus.word_size()?;

        Ok(Self {
            config,
            word,
            flag: RunFlag::new(),
            transitions: vec![State::Idle],
        })
    }

    /// Handle for stopping the poll loop from elsewhere.
    pub fn flag(&self) -> RunFlag {
        self.flag.clone()
    }

    pub fn state(&self) -> State {
        self.transitions.last().copied().unwrap_or(State::Idle)
    }

    /// Every state visited so far, oldest first.
    pub fn transitions(&self) -> &[State] {
        &self.transitions
    }

    fn enter(&mut self, state: State) {
        debug!("{:?} -> {:?}", self.state(), state);
        self.transitions.push(state);
    }

    /// Run the device until the run flag is cleared.
    ///
    /// `open` acquires the transport, its failure is the only fatal error. `install_stop`
    /// receives the run flag just before polling starts. The flag is only checked between
    /// reads, so stopping can take up to one poll interval.
    pub fn run<T, E, O, H>(
        &mut self,
        open: O,
        install_stop: H,
    ) -> Result<RunSummary, LifecycleError<E>>
    where
        T: SpiTransport,
        E: std::error::Error + 'static,
        O: FnOnce(&BusConfig) -> Result<T, E>,
        H: FnOnce(RunFlag),
    {
        let bus = &self.config.bus;
        let (bus_id, chip_select) = (bus.bus_id, bus.chip_select);

        self.enter(State::Opening);

        let mut transport = match open(&self.config.bus) {
            Ok(transport) => transport,
            Err(source) => {
                error!("Could not open SPI bus {bus_id}: {source}");
                self.enter(State::Failed);
                return Err(LifecycleError::Open {
                    bus: bus_id,
                    chip_select,
                    source,
                });
            }
        };

        let mut summary = RunSummary::default();

        self.enter(State::Configuring);

        if let Err(error) = device::configure(&mut transport, &self.config.bus) {
            warn!("Warning, {error}: {}", error.source);
            summary.warnings += 1;
        }

        device::report_status(&transport);

        match transport.enable_cs() {
            Ok(()) => info!("CS enabled"),
            Err(error) => {
                warn!("Warning, could not enable chip select: {error}");
                summary.warnings += 1;
            }
        }

        self.enter(State::ChipSelectEnabled);

        if let Err(error) = device::send_control_byte(
            &mut transport,
            ControlByte::continuous_write(),
            self.config.bus.word_bits,
        ) {
            warn!("Warning, {error}");
            summary.warnings += 1;
        }

        install_stop(self.flag.clone());

        self.enter(State::Polling);
        self.poll(&mut transport, &mut summary);

        match transport.disable_cs() {
            Ok(()) => info!("CS disabled"),
            Err(error) => {
                warn!("Warning, could not disable chip select: {error}");
                summary.warnings += 1;
            }
        }

        self.enter(State::ChipSelectDisabled);

        transport.close();

        self.enter(State::Closed);

        Ok(summary)
    }

    fn poll<T: SpiTransport>(&self, transport: &mut T, summary: &mut RunSummary) {
        let mut iteration: u64 = 0;

        while self.flag.is_running() {
            match device::read_sample(transport, self.word) {
                Ok(value) => {
                    summary.samples += 1;
                    summary.last_sample = Some(value);

                    if self.config.poll.print_samples {
                        info!("Iteration {iteration}. Read value: {value}");
                    }
                }
                Err(error) => {
                    summary.read_failures += 1;
                    warn!("Read failed on iteration {iteration}: {error}");
                }
            }

            sleep(self.config.poll.interval);
            iteration += 1;
        }
    }
}

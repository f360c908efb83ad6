//! MCP3903 specific use of an [`SpiTransport`].

use log::{debug, info};
use mcp3903::{decode_sample, ControlByte, WordSize};

use crate::config::BusConfig;
use crate::error::{ConfigError, ConfigStage, ControlError, ReadError};
use crate::transport::SpiTransport;

/// Apply the bus settings in order: frequency, word size, clock mode, chip select
/// polarity then bit order. Stops at the first setting the transport rejects.
pub fn configure<T: SpiTransport>(
    transport: &mut T,
    config: &BusConfig,
) -> Result<(), ConfigError<T::Error>> {
    fn stage<E: std::error::Error + 'static>(
        stage: ConfigStage,
    ) -> impl FnOnce(E) -> ConfigError<E> {
        move |source| ConfigError { stage, source }
    }

    transport
        .set_max_frequency(config.frequency_hz)
        .map_err(stage(ConfigStage::MaxFrequency))?;
    transport
        .set_bits_per_word(config.word_bits)
        .map_err(stage(ConfigStage::BitsPerWord))?;
    transport
        .set_clock_mode(config.clock_mode)
        .map_err(stage(ConfigStage::ClockMode))?;

    if config.cs_active_low {
        transport
            .set_cs_active_low()
            .map_err(stage(ConfigStage::ChipSelectPolarity))?;
    }

    transport
        .set_bit_order(config.bit_order)
        .map_err(stage(ConfigStage::BitOrder))?;

    Ok(())
}

/// Log the bus configuration as the transport reports it.
pub fn report_status<T: SpiTransport>(transport: &T) {
    match transport.mode() {
        Ok(mode) => info!("SPI clock mode: {}", mode.number()),
        Err(error) => info!("SPI clock mode: unavailable ({error})"),
    }

    match transport.max_frequency() {
        Ok(hz) => info!("SPI frequency: {hz} Hz"),
        Err(error) => info!("SPI frequency: unavailable ({error})"),
    }

    match transport.bits_per_word() {
        Ok(bits) => info!("SPI bits per word: {bits}"),
        Err(error) => info!("SPI bits per word: unavailable ({error})"),
    }
}

/// Write `control` as a single 8 bit word, then restore `word_bits` for sample reads.
///
/// The restore is attempted even when the write fails.
pub fn send_control_byte<T: SpiTransport>(
    transport: &mut T,
    control: ControlByte,
    word_bits: u8,
) -> Result<(), ControlError<T::Error>> {
    debug!("Control byte: {control:08b}");

    transport.set_bits_per_word(8).map_err(ControlError::Narrow)?;

    let written = transport.write(&[control.bits()]);

    transport
        .set_bits_per_word(word_bits)
        .map_err(|source| ControlError::Restore {
            bits: word_bits,
            source,
        })?;

    written.map_err(ControlError::Write)?;

    Ok(())
}

/// Read a single word from the converter. A read that fills less than the word is an error.
pub fn read_sample<T: SpiTransport>(
    transport: &mut T,
    word: WordSize,
) -> Result<i32, ReadError<T::Error>> {
    let mut frame = [0u8; 3];
    let frame = &mut frame[..word.bytes()];

    let got = transport.read(frame).map_err(ReadError::Transport)?;

    if got < frame.len() {
        return Err(ReadError::Short {
            expected: frame.len(),
            got,
        });
    }

    Ok(decode_sample(word, frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BitOrder, ClockMode};
    use crate::transport::mock::{Call, Faults, MockTransport};

    fn scenario_config() -> BusConfig {
        BusConfig {
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

    #[test]
    fn configure_issues_five_calls_in_order() {
        let mut transport = MockTransport::new(Faults::default());
        let log = transport.log();

        configure(&mut transport, &scenario_config()).unwrap();

        assert_eq!(
            log.borrow().calls,
            vec![
                Call::SetMaxFrequency(4_000_000),
                Call::SetBitsPerWord(24),
                Call::SetClockMode(3),
                Call::SetCsActiveLow,
                Call::SetBitOrder(BitOrder::MsbFirst),
            ]
        );
    }

    #[test]
    fn configure_fails_fast_with_stage() {
        let mut transport = MockTransport::new(Faults {
            bits_per_word: true,
            ..Faults::default()
        });
        let log = transport.log();

        let error = configure(&mut transport, &scenario_config()).unwrap_err();

        assert_eq!(error.stage, ConfigStage::BitsPerWord);
        assert_eq!(error.to_string(), "could not set bits per word");
        assert_eq!(log.borrow().calls.len(), 2);
    }

    #[test]
    fn control_byte_is_sent_as_8_bits_and_word_size_restored() {
        let mut transport = MockTransport::new(Faults::default());
        let log = transport.log();
        configure(&mut transport, &scenario_config()).unwrap();

        send_control_byte(&mut transport, ControlByte::continuous_write(), 24).unwrap();

        let shared = log.borrow();
        let write = shared
            .calls
            .iter()
            .position(|call| *call == Call::Write(vec![0x85]))
            .expect("control byte written");

        assert_eq!(shared.bits_at_call[write], 8);
        assert_eq!(shared.calls[write + 1], Call::SetBitsPerWord(24));
        drop(shared);

        assert_eq!(transport.bits_per_word(), Ok(24));
    }

    #[test]
    fn failed_write_still_restores_word_size() {
        let mut transport = MockTransport::new(Faults {
            write: true,
            ..Faults::default()
        });
        transport.set_bits_per_word(16).unwrap();

        let error = send_control_byte(&mut transport, ControlByte::continuous_write(), 16);

        assert!(matches!(error, Err(ControlError::Write(_))));
        assert_eq!(transport.bits_per_word(), Ok(16));
    }

    #[test]
    fn samples_are_read_one_word_at_a_time() {
        let mut transport =
            MockTransport::new(Faults::default()).with_frames([vec![0xFF, 0xFF, 0xFE], vec![0x01]]);
        let log = transport.log();

        assert_eq!(read_sample(&mut transport, WordSize::Bits24).unwrap(), -2);
        assert_eq!(read_sample(&mut transport, WordSize::Bits8).unwrap(), 1);
        assert_eq!(log.borrow().calls, vec![Call::Read(3), Call::Read(1)]);
    }

    #[test]
    fn short_read_is_an_error_not_a_sample() {
        let mut transport = MockTransport::new(Faults {
            short_reads: vec![0],
            ..Faults::default()
        })
        .with_frames([vec![0x80]]);

        let error = read_sample(&mut transport, WordSize::Bits24).unwrap_err();

        assert!(matches!(
            error,
            ReadError::Short {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn failed_narrowing_skips_the_write() {
        let mut transport = MockTransport::new(Faults {
            refused_bits: vec![8],
            ..Faults::default()
        });
        let log = transport.log();

        let error = send_control_byte(&mut transport, ControlByte::continuous_write(), 24);

        assert!(matches!(error, Err(ControlError::Narrow(_))));
        assert!(!log
            .borrow()
            .calls
            .iter()
            .any(|call| matches!(call, Call::Write(_))));
    }

    #[test]
    fn failed_restore_is_reported_with_the_word_size() {
        let mut transport = MockTransport::new(Faults {
            refused_bits: vec![24],
            ..Faults::default()
        });
        let log = transport.log();

        let error = send_control_byte(&mut transport, ControlByte::continuous_write(), 24);

        assert!(matches!(
            error,
            Err(ControlError::Restore { bits: 24, .. })
        ));
        assert!(log.borrow().calls.contains(&Call::Write(vec![0x85])));
    }
}

// Fake Frog — Channel Sampler
//
// Reads each thermistor input several times, averages the raw codes to knock
// down noise, and converts the mean to resistance and temperature. Channels
// are always sampled in id order so the CSV columns stay stable.

use heapless::Vec;

use crate::config::{ChannelConfig, MAX_CHANNELS};
use crate::convert;
use crate::drivers::{AnalogInput, Timebase};
use crate::error::SensorError;
use crate::events::Reading;

/// Sample one channel: `sample_count` reads separated by a blocking
/// `delay_ms` pause, averaged and converted. A zero `sample_count` is treated
/// as one.
pub fn sample<A, T>(
    channel: &ChannelConfig,
    input: &mut A,
    timebase: &mut T,
    sample_count: u16,
    delay_ms: u32,
    adc_max_code: f64,
) -> Result<Reading, SensorError>
where
    A: AnalogInput + ?Sized,
    T: Timebase + ?Sized,
{
    let count = sample_count.max(1);
    let mut sum = 0.0f64;
    for _ in 0..count {
        sum += input.read_raw()? as f64;
        timebase.delay_ms(delay_ms as u64);
    }
    let raw_mean = sum / count as f64;

    if !convert::raw_in_range(raw_mean, adc_max_code) {
        log::warn!(
            "Channel {} raw mean {:.1} at ADC rail (open or shorted sensor?)",
            channel.id,
            raw_mean
        );
    }

    let resistance_ohm =
        convert::resistance_from_raw(raw_mean, channel.series_resistance, adc_max_code);
    let temperature_c = convert::temperature_from_resistance(
        resistance_ohm,
        channel.nominal_resistance,
        channel.beta,
        convert::celsius_to_kelvin(channel.nominal_temp_c),
    );

    Ok(Reading {
        channel_id: channel.id,
        raw_mean,
        resistance_ohm,
        temperature_c,
    })
}

/// The configured channels with their inputs, plus the reading buffer that
/// is overwritten in place every cycle.
pub struct ChannelSampler<A> {
    channels: Vec<(ChannelConfig, A), MAX_CHANNELS>,
    readings: Vec<Reading, MAX_CHANNELS>,
    sample_count: u16,
    delay_ms: u32,
    adc_max_code: f64,
}

impl<A: AnalogInput> ChannelSampler<A> {
    /// Pairs `channels` with `inputs` in order and sorts by channel id.
    /// Extra inputs or channels beyond the shorter list are ignored.
    pub fn new(
        channels: &[ChannelConfig],
        inputs: impl IntoIterator<Item = A>,
        sample_count: u16,
        delay_ms: u32,
        adc_max_code: f64,
    ) -> Self {
        let mut paired: Vec<(ChannelConfig, A), MAX_CHANNELS> = Vec::new();
        for (cfg, input) in channels.iter().zip(inputs) {
            if paired.push((cfg.clone(), input)).is_err() {
                break;
            }
        }
        paired.sort_unstable_by_key(|(cfg, _)| cfg.id);

        let readings = paired
            .iter()
            .map(|(cfg, _)| Reading {
                channel_id: cfg.id,
                ..Reading::default()
            })
            .collect();

        Self {
            channels: paired,
            readings,
            sample_count,
            delay_ms,
            adc_max_code,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelConfig> {
        self.channels.iter().map(|(cfg, _)| cfg)
    }

    /// Latest readings, one per channel in id order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Sample every channel in order. Stops at the first failed read; the
    /// buffer then holds a mix of old and new values and must not be written.
    pub fn sample_all<T: Timebase + ?Sized>(
        &mut self,
        timebase: &mut T,
    ) -> Result<&[Reading], SensorError> {
        for (slot, (cfg, input)) in self.readings.iter_mut().zip(self.channels.iter_mut()) {
            *slot = sample(
                cfg,
                input,
                &mut *timebase,
                self.sample_count,
                self.delay_ms,
                self.adc_max_code,
            )?;
        }
        Ok(self.readings.as_slice())
    }
}

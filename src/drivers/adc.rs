// Fake Frog — Thermistor ADC inputs
//
// One-shot reads on ADC1 via raw ESP-IDF calls, 12-bit, 11 dB attenuation
// (0–3.3 V). The unit is created once and never deleted, so every input can
// hold a copy of its handle.

use crate::drivers::AnalogInput;
use crate::error::SensorError;

pub struct AdcUnit {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
}

impl AdcUnit {
    pub fn new() -> Result<Self, SensorError> {
        let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let ret = unsafe {
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle)
        };
        if ret != esp_idf_sys::ESP_OK {
            return Err(SensorError::ReadFailed {
                channel: 0,
                detail: format!("ADC unit init failed ({})", ret),
            });
        }
        Ok(Self { handle })
    }

    /// Configure `adc_channel` (ADC1_CHANNEL_n) for logger channel `id`.
    pub fn channel(&self, id: u8, adc_channel: u32) -> Result<ThermistorInput, SensorError> {
        let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
            atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
            bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let ret = unsafe {
            esp_idf_sys::adc_oneshot_config_channel(self.handle, adc_channel as _, &chan_cfg)
        };
        if ret != esp_idf_sys::ESP_OK {
            return Err(SensorError::ReadFailed {
                channel: id,
                detail: format!("ADC channel config failed ({})", ret),
            });
        }
        Ok(ThermistorInput {
            handle: self.handle,
            adc_channel,
            id,
        })
    }
}

pub struct ThermistorInput {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
    adc_channel: u32,
    id: u8,
}

impl AnalogInput for ThermistorInput {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        let ret = unsafe {
            esp_idf_sys::adc_oneshot_read(self.handle, self.adc_channel as _, &mut raw)
        };
        if ret != esp_idf_sys::ESP_OK {
            return Err(SensorError::ReadFailed {
                channel: self.id,
                detail: format!("adc_oneshot_read returned {}", ret),
            });
        }
        Ok(raw.clamp(0, u16::MAX as i32) as u16)
    }
}

// Fake Frog — Thermistor unit conversion
//
// Raw ADC code → resistance → temperature.
//
// The thermistor sits on the low side of a divider with a fixed series
// resistor, so a higher ADC code means a higher thermistor resistance and,
// for an NTC part, a lower temperature.
//
// These are total functions over `f64`: a raw mean at either rail yields an
// infinite or zero resistance (and a temperature at absolute zero) instead of
// panicking. Callers that care range-check the raw mean first.

pub const ZERO_CELSIUS_KELVIN: f64 = 273.15;

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + ZERO_CELSIUS_KELVIN
}

/// `R = R_series / (max_code / raw_mean − 1)`
pub fn resistance_from_raw(raw_mean: f64, series_resistance: f64, adc_max_code: f64) -> f64 {
    series_resistance / (adc_max_code / raw_mean - 1.0)
}

/// Simplified Beta equation:
/// `T = 1 / (ln(R / R_nom) / B + 1 / T_nom) − 273.15`
pub fn temperature_from_resistance(
    resistance: f64,
    nominal_resistance: f64,
    beta: f64,
    nominal_temp_kelvin: f64,
) -> f64 {
    1.0 / ((resistance / nominal_resistance).ln() / beta + 1.0 / nominal_temp_kelvin)
        - ZERO_CELSIUS_KELVIN
}

/// Inverse of [`temperature_from_resistance`].
pub fn resistance_from_temperature(
    temperature_c: f64,
    nominal_resistance: f64,
    beta: f64,
    nominal_temp_kelvin: f64,
) -> f64 {
    let t = celsius_to_kelvin(temperature_c);
    nominal_resistance * (beta * (1.0 / t - 1.0 / nominal_temp_kelvin)).exp()
}

/// Inverse of [`resistance_from_raw`]: the (fractional) ADC code a divider
/// with this resistance would produce.
pub fn raw_from_resistance(resistance: f64, series_resistance: f64, adc_max_code: f64) -> f64 {
    adc_max_code * resistance / (resistance + series_resistance)
}

/// `true` when `raw_mean` lies strictly inside the converter's range, where
/// both conversions are finite.
pub fn raw_in_range(raw_mean: f64, adc_max_code: f64) -> bool {
    raw_mean > 0.0 && raw_mean < adc_max_code
}

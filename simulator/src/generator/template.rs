use std::f64::consts::PI;

/// Sine waveform with `frequency` full periods across `length` samples.
pub fn sine_wave(length: usize, frequency: f64) -> Vec<f64> {
    (0..length)
        .map(|i| ((i as f64 * frequency) / length as f64 * 2.0 * PI).sin())
        .collect()
}

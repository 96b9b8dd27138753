use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::sine_wave;

/// Configuration for generating synthetic telemetry lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub messages: usize,
    pub rate_hz: f64,
    pub frequency: f64,
    pub noise: f64,
    pub malformed_ratio: f64,
    pub seed: u64,
    pub include_imu1: bool,
    pub include_gnss: bool,
    pub origin: [f64; 3],
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            messages: 1000,
            rate_hz: 100.0,
            frequency: 5.0,
            noise: 0.02,
            malformed_ratio: 0.05,
            seed: 0,
            include_imu1: true,
            include_gnss: true,
            origin: [31.2304, 121.4737, 12.0],
        }
    }
}

fn jitter(rng: &mut StdRng, noise: f64) -> f64 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

fn imu_segment(tag: &str, sec: f64, nsec: f64, wave: f64, rng: &mut StdRng, noise: f64) -> String {
    let orientation = [
        jitter(rng, noise),
        jitter(rng, noise),
        wave * 0.1 + jitter(rng, noise),
    ];
    let angular_velocity = [
        wave + jitter(rng, noise),
        0.5 * wave + jitter(rng, noise),
        -wave + jitter(rng, noise),
    ];
    let linear_acceleration = [
        jitter(rng, noise),
        jitter(rng, noise),
        9.81 + jitter(rng, noise),
    ];

    let fields: Vec<String> = orientation
        .iter()
        .chain(angular_velocity.iter())
        .chain(linear_acceleration.iter())
        .map(|value| format!("{:.6}", value))
        .collect();
    format!("{},{},{},{}", tag, sec, nsec, fields.join(","))
}

fn malformed_line(rng: &mut StdRng, index: usize) -> String {
    match rng.gen_range(0..3) {
        0 => format!("garbage-{}", index),
        1 => format!("imu0,{},0,0.1,0.2", index),
        _ => format!("gnss,{}", index),
    }
}

/// Builds raw lines in the `imu0,...;imu1,...;gnss,...` wire format. A share
/// of lines is replaced by structurally broken ones.
pub fn build_messages(config: &GeneratorConfig) -> anyhow::Result<Vec<String>> {
    ensure!(config.rate_hz > 0.0, "rate_hz must be positive");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let wave = sine_wave(config.messages, config.frequency);
    let malformed_ratio = config.malformed_ratio.clamp(0.0, 1.0);
    let [lat, lng, alt] = config.origin;
    let mut lines = Vec::with_capacity(config.messages);

    for (index, &sample) in wave.iter().enumerate() {
        if rng.gen_bool(malformed_ratio) {
            lines.push(malformed_line(&mut rng, index));
            continue;
        }

        let elapsed = index as f64 / config.rate_hz;
        let sec = elapsed.trunc();
        let nsec = ((elapsed - sec) * 1e9).round();

        let mut segments = vec![imu_segment("imu0", sec, nsec, sample, &mut rng, config.noise)];
        if config.include_imu1 {
            segments.push(imu_segment(
                "imu1",
                sec,
                nsec,
                -sample,
                &mut rng,
                config.noise,
            ));
        }
        if config.include_gnss {
            let drift = elapsed * 1e-5;
            segments.push(format!(
                "gnss,{:.7},{:.7},{:.2}",
                lat + drift,
                lng + drift,
                alt + jitter(&mut rng, config.noise)
            ));
        }
        lines.push(segments.join(";"));
    }

    Ok(lines)
}

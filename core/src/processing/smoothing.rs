/// Window used when callers have no preference.
pub const DEFAULT_WINDOW: usize = 5;

/// Centered moving average over `[i - w/2, i + w/2]`, clamped to the data.
///
/// Windows shrink near both ends instead of padding, so edge outputs average
/// fewer samples than interior ones. Input shorter than the window is
/// returned as-is.
pub fn moving_average(data: &[f64], window_size: usize) -> Vec<f64> {
    if data.len() < window_size {
        return data.to_vec();
    }

    let half = window_size / 2;
    let last = data.len().saturating_sub(1);

    (0..data.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half).min(last);
            let window = &data[start..=end];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

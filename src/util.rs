/// Mean answer time in seconds, None when nothing was answered
pub fn average_secs(latencies: &[u64]) -> Option<f64> {
    match latencies.len() {
        0 => None,
        count => Some(latencies.iter().sum::<u64>() as f64 / count as f64),
    }
}

/// Number of answers given within `limit_secs`
pub fn count_within(latencies: &[u64], limit_secs: u64) -> usize {
    latencies.iter().filter(|&&s| s <= limit_secs).count()
}

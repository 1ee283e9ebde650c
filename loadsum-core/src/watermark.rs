/// Peak concurrency observed across the run's samples.
#[must_use]
pub fn peak(samples: &[u64]) -> u64 {
    samples.iter().copied().fold(0, u64::max)
}

/// Folds the per-interval concurrency samples into the set of watermarks
/// the run crossed, in the order the watermarks are configured. A watermark
/// counts as crossed once any sample reaches it.
#[must_use]
pub fn crossed(samples: &[u64], watermarks: &[u64]) -> Vec<u64> {
    let peak = peak(samples);
    watermarks.iter().copied().filter(|w| peak >= *w).collect()
}

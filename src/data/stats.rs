//! Running statistics computed locally.
//!
//! Same semantics as the backend service: windows look back over at most
//! `period` points (clamped to the series length), the first points use
//! whatever is available, and the standard deviation is the sample
//! deviation with the first point pinned to zero.

use std::collections::BTreeMap;

use crate::protocol::{StatsPayload, StatsRequest};

fn window(period: usize, len: usize) -> usize {
    period.clamp(1, len.max(1))
}

/// Rolling mean over the trailing `period` points.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let p = window(period, values.len());
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= p {
            sum -= values[i - p];
        }
        let n = (i + 1).min(p);
        out.push(sum / n as f64);
    }
    out
}

/// Rolling sample standard deviation over the trailing `period` points.
pub fn rolling_stdev(values: &[f64], period: usize) -> Vec<f64> {
    let p = window(period, values.len());
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let start = (i + 1).saturating_sub(p);
            let win = &values[start..=i];
            if i == 0 || win.len() < 2 {
                return 0.0;
            }
            let mean = win.iter().sum::<f64>() / win.len() as f64;
            let ss: f64 = win.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (win.len() - 1) as f64).sqrt()
        })
        .collect()
}

/// Answers stats requests without a backend round-trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStats;

impl LocalStats {
    pub fn answer(&self, request: &StatsRequest) -> StatsPayload {
        let mut avgs = BTreeMap::new();
        let mut stdevs = BTreeMap::new();
        for (key, values) in &request.channels {
            avgs.insert(*key, rolling_mean(values, request.avg_period));
            stdevs.insert(*key, rolling_stdev(values, request.stdev_period));
        }
        StatsPayload { avgs, stdevs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_uses_partial_windows_at_start() {
        let m = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(m, vec![1.0, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn period_longer_than_series_is_clamped() {
        let m = rolling_mean(&[2.0, 4.0], 10);
        assert_eq!(m, vec![2.0, 3.0]);
    }

    #[test]
    fn stdev_starts_at_zero() {
        let s = rolling_stdev(&[1.0, 3.0, 5.0], 2);
        assert_eq!(s[0], 0.0);
        assert!((s[1] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((s[2] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_series_yield_empty_output() {
        assert!(rolling_mean(&[], 3).is_empty());
        assert!(rolling_stdev(&[], 3).is_empty());
    }
}

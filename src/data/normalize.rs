//! Display normalization of trace axes.
//!
//! Y normalization maps a channel from its own `[min, max]` onto `[-1, 1]`.
//! A constant channel (`min == max`) normalizes to `0` when the constant is
//! zero and to its sign otherwise; denormalizing it gives back `min`.

#[inline]
pub fn normalize_value(v: f64, min: f64, max: f64) -> f64 {
    if min == max {
        if min == 0.0 {
            0.0
        } else if min >= 0.0 {
            1.0
        } else {
            -1.0
        }
    } else {
        2.0 * (v - min) / (max - min) - 1.0
    }
}

#[inline]
pub fn denormalize_value(n: f64, min: f64, max: f64) -> f64 {
    if min == max {
        min
    } else {
        (n + 1.0) / 2.0 * (max - min) + min
    }
}

pub fn normalize_values(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    values.iter().map(|&v| normalize_value(v, min, max)).collect()
}

pub fn denormalize_values(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    values.iter().map(|&n| denormalize_value(n, min, max)).collect()
}

/// Add `by` to every value (X origin shift).
pub fn shift_values(values: &[f64], by: f64) -> Vec<f64> {
    values.iter().map(|&v| v + by).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_range_maps_onto_unit_interval() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(normalize_values(&v, 0.0, 40.0), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn constant_channels_follow_sign() {
        assert_eq!(normalize_values(&[5.0; 3], 5.0, 5.0), vec![1.0; 3]);
        assert_eq!(normalize_values(&[-5.0; 3], -5.0, -5.0), vec![-1.0; 3]);
        assert_eq!(normalize_values(&[0.0; 3], 0.0, 0.0), vec![0.0; 3]);
        assert_eq!(denormalize_values(&[1.0; 3], 5.0, 5.0), vec![5.0; 3]);
    }

    #[test]
    fn denormalize_undoes_normalize() {
        let cases: [&[f64]; 4] = [
            &[-3.5, 0.25, 7.125, -0.001, 2.0],
            &[1e-3, 2e-3, -4e-3],
            &[-120.0, -80.5, -99.9],
            &[0.1, 0.2, 0.3, 1e6],
        ];
        for v in cases {
            let min = v.iter().copied().fold(f64::INFINITY, f64::min);
            let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let n = normalize_values(v, min, max);
            assert!(n.iter().all(|x| (-1.0..=1.0).contains(x)));
            for (back, orig) in denormalize_values(&n, min, max).iter().zip(v) {
                assert!((back - orig).abs() <= 1e-9 * orig.abs().max(1.0), "{back} != {orig}");
            }
        }
    }
}

//! The two periodic demand shapes the worked examples drive switches with:
//! a sawtooth ramp and a (shifted-cosine) wave. Both return instantaneous
//! demand at time `t`, not a request list — [`crate::generator`] turns a
//! per-switch demand function into actual requests.

use std::f64::consts::PI;

/// Ramps linearly from `y_shift * max_demand` up to `(1 + y_shift) *
/// max_demand` and back down, over `period`, offset by `offset`.
pub fn sawtooth(t: f64, period: f64, offset: f64, max_demand: f64, y_shift: f64) -> f64 {
    let phase = (t + offset).rem_euclid(period);
    let half = period / 2.0;
    let base = if phase < half {
        phase / half * max_demand
    } else {
        (period - phase) / half * max_demand
    };
    base + y_shift * max_demand
}

/// An inverted cosine, shaped to share `sawtooth`'s `(t, period, offset,
/// max_demand, y_shift)` signature and its 0-to-max-to-0 envelope.
pub fn wave(t: f64, period: f64, offset: f64, max_demand: f64, y_shift: f64) -> f64 {
    let phase = (t + offset - period / 4.0).rem_euclid(period);
    let radians = phase / period * (2.0 * PI);
    let raw = (radians.sin() + 1.0) / 2.0;
    raw * max_demand + y_shift * max_demand
}

/// Which waveform a [`crate::generator::dual_offset_workload`] call drives
/// its two switches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sawtooth,
    Wave,
}

impl Waveform {
    pub fn eval(self, t: f64, period: f64, offset: f64, max_demand: f64, y_shift: f64) -> f64 {
        match self {
            Waveform::Sawtooth => sawtooth(t, period, offset, max_demand, y_shift),
            Waveform::Wave => wave(t, period, offset, max_demand, y_shift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sawtooth_hits_its_extremes() {
        for period in [4.0, 5.0, 8.0, 10.0] {
            let max_demand = 10.0;
            for rep in 0..2 {
                let t0 = rep as f64 * period;
                assert!((sawtooth(t0, period, 0.0, max_demand, 0.0) - 0.0).abs() < 1e-9);
                assert!(
                    (sawtooth(t0, period, period / 2.0, max_demand, 0.0) - max_demand).abs()
                        < 1e-9
                );
                assert!(
                    (sawtooth(t0 + period / 2.0, period, 0.0, max_demand, 0.0) - max_demand).abs()
                        < 1e-9
                );
                assert!(
                    (sawtooth(t0 + period / 2.0, period, period / 2.0, max_demand, 0.0) - 0.0)
                        .abs()
                        < 1e-9
                );
            }
        }
    }

    #[test]
    fn wave_matches_known_samples() {
        let period = 4.0;
        let max_demand = 2.0;
        let expected = [0.0, 1.0, 2.0, 1.0, 0.0];
        for (i, &want) in expected.iter().enumerate() {
            let got = wave(i as f64, period, 0.0, max_demand, 0.0);
            assert!((got - want).abs() < 1e-9, "t={i}: got {got}, want {want}");
        }
    }
}

//! Per-vital severity bands and the weighted total
//!
//! Every vital maps to an integer sub-score from 0 (normal) to 5. Bands are
//! checked most severe first and cover both tails of the range, so a heart
//! rate that is too slow scores like one that is too fast.

use crate::model::VitalSigns;

pub const WEIGHT_HEART_RATE: f64 = 1.5;
pub const WEIGHT_BLOOD_PRESSURE: f64 = 1.8;
pub const WEIGHT_TEMPERATURE: f64 = 1.0;
pub const WEIGHT_OXYGEN: f64 = 2.0;
pub const WEIGHT_RESPIRATORY_RATE: f64 = 1.5;
pub const WEIGHT_PAIN: f64 = 0.8;

/// A reading of exactly zero is what a missing form field decodes to.
/// It is treated as not recorded rather than as a physiological value.
pub fn recorded(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Sub-scores for the six weighted vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubScores {
    pub heart_rate: u8,
    pub blood_pressure: u8,
    pub temperature: u8,
    pub oxygen: u8,
    pub respiratory_rate: u8,
    pub pain: u8,
}

impl SubScores {
    pub fn from_vitals(vitals: &VitalSigns) -> Self {
        Self {
            heart_rate: heart_rate_score(vitals.heart_rate_bpm),
            blood_pressure: systolic_bp_score(vitals.systolic_bp),
            temperature: temperature_score(vitals.temp_c),
            oxygen: spo2_score(vitals.spo2_percent),
            respiratory_rate: resp_rate_score(vitals.resp_rate_min),
            pain: pain_score(vitals.pain_score),
        }
    }

    /// Sum of sub-scores times their clinical-importance weights
    pub fn weighted_total(&self) -> f64 {
        f64::from(self.heart_rate) * WEIGHT_HEART_RATE
            + f64::from(self.blood_pressure) * WEIGHT_BLOOD_PRESSURE
            + f64::from(self.temperature) * WEIGHT_TEMPERATURE
            + f64::from(self.oxygen) * WEIGHT_OXYGEN
            + f64::from(self.respiratory_rate) * WEIGHT_RESPIRATORY_RATE
            + f64::from(self.pain) * WEIGHT_PAIN
    }
}

pub fn heart_rate_score(bpm: f64) -> u8 {
    let Some(hr) = recorded(bpm) else {
        return 0;
    };

    if hr > 150.0 || hr <= 20.0 {
        4
    } else if hr > 130.0 || hr <= 30.0 {
        3
    } else if hr > 110.0 || hr <= 40.0 {
        2
    } else if hr > 90.0 || hr <= 50.0 {
        1
    } else {
        0
    }
}

pub fn systolic_bp_score(mmhg: f64) -> u8 {
    let Some(bp) = recorded(mmhg) else {
        return 0;
    };

    if bp < 70.0 {
        4
    } else if bp < 80.0 || bp >= 180.0 {
        3
    } else if bp < 90.0 || bp >= 160.0 {
        2
    } else if bp < 100.0 || bp >= 140.0 {
        1
    } else {
        0
    }
}

pub fn temperature_score(celsius: f64) -> u8 {
    let Some(t) = recorded(celsius) else {
        return 0;
    };

    if t >= 41.0 || t < 33.0 {
        5
    } else if t > 40.0 || t < 34.0 {
        4
    } else if t > 39.0 || t < 35.0 {
        3
    } else if t > 38.0 || t < 36.0 {
        2
    } else if t > 37.4 || t < 36.1 {
        1
    } else {
        0
    }
}

pub fn spo2_score(percent: f64) -> u8 {
    let Some(o2) = recorded(percent) else {
        return 0;
    };

    if o2 < 85.0 {
        5
    } else if o2 < 90.0 {
        4
    } else if o2 < 92.0 {
        3
    } else if o2 < 94.0 {
        2
    } else if o2 < 96.0 {
        1
    } else {
        0
    }
}

pub fn resp_rate_score(per_min: f64) -> u8 {
    let Some(rr) = recorded(per_min) else {
        return 0;
    };

    if rr >= 35.0 || rr <= 6.0 {
        4
    } else if rr >= 30.0 || rr <= 7.0 {
        3
    } else if rr >= 25.0 || rr <= 9.0 {
        2
    } else if rr >= 21.0 || rr <= 11.0 {
        1
    } else {
        0
    }
}

pub fn pain_score(scale: f64) -> u8 {
    if scale >= 10.0 {
        5
    } else if scale >= 9.0 {
        4
    } else if scale >= 7.0 {
        3
    } else if scale >= 5.0 {
        2
    } else if scale >= 3.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_non_decreasing(readings: impl Iterator<Item = f64>, band: fn(f64) -> u8) {
        let mut previous = 0;
        for reading in readings {
            let score = band(reading);
            assert!(
                score >= previous,
                "sub-score dropped from {} to {} at {}",
                previous,
                score,
                reading
            );
            previous = score;
        }
    }

    #[test]
    fn test_normal_vitals_score_zero() {
        let vitals = VitalSigns {
            heart_rate_bpm: 75.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            temp_c: 37.0,
            spo2_percent: 98.0,
            resp_rate_min: 16.0,
            pain_score: 2.0,
            gcs_total: None,
        };
        let scores = SubScores::from_vitals(&vitals);
        assert_eq!(scores, SubScores::default());
        assert_eq!(scores.weighted_total(), 0.0);
    }

    #[test]
    fn test_missing_vitals_route_through_normal_band() {
        assert_eq!(SubScores::from_vitals(&VitalSigns::default()), SubScores::default());
    }

    #[test]
    fn test_heart_rate_tails_are_symmetric() {
        assert_eq!(heart_rate_score(160.0), 4);
        assert_eq!(heart_rate_score(15.0), 4);
        assert_eq!(heart_rate_score(140.0), 3);
        assert_eq!(heart_rate_score(25.0), 3);
        assert_eq!(heart_rate_score(120.0), 2);
        assert_eq!(heart_rate_score(40.0), 2);
        assert_eq!(heart_rate_score(95.0), 1);
        assert_eq!(heart_rate_score(50.0), 1);
        assert_eq!(heart_rate_score(90.0), 0);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(systolic_bp_score(69.0), 4);
        assert_eq!(systolic_bp_score(180.0), 3);
        assert_eq!(systolic_bp_score(139.0), 0);
        assert_eq!(temperature_score(41.0), 5);
        assert_eq!(temperature_score(32.5), 5);
        assert_eq!(temperature_score(37.5), 1);
        assert_eq!(temperature_score(36.1), 0);
        assert_eq!(spo2_score(84.0), 5);
        assert_eq!(spo2_score(95.5), 1);
        assert_eq!(spo2_score(96.0), 0);
        assert_eq!(resp_rate_score(35.0), 4);
        assert_eq!(resp_rate_score(12.0), 0);
        assert_eq!(resp_rate_score(11.0), 1);
        assert_eq!(pain_score(10.0), 5);
        assert_eq!(pain_score(2.9), 0);
    }

    #[test]
    fn test_worsening_never_lowers_sub_score() {
        assert_non_decreasing((90..=220).map(f64::from), heart_rate_score);
        assert_non_decreasing((1..=90).rev().map(f64::from), heart_rate_score);
        assert_non_decreasing((120..=260).map(f64::from), systolic_bp_score);
        assert_non_decreasing((1..=120).rev().map(f64::from), systolic_bp_score);
        assert_non_decreasing((370..=440).map(|t| f64::from(t) / 10.0), temperature_score);
        assert_non_decreasing((300..=370).rev().map(|t| f64::from(t) / 10.0), temperature_score);
        assert_non_decreasing((1..=100).rev().map(f64::from), spo2_score);
        assert_non_decreasing((16..=60).map(f64::from), resp_rate_score);
        assert_non_decreasing((1..=16).rev().map(f64::from), resp_rate_score);
        assert_non_decreasing((0..=10).map(f64::from), pain_score);
    }

    #[test]
    fn test_weights_applied() {
        let scores = SubScores {
            heart_rate: 1,
            blood_pressure: 1,
            temperature: 1,
            oxygen: 1,
            respiratory_rate: 1,
            pain: 1,
        };
        let total = scores.weighted_total();
        assert!((total - 8.6).abs() < 1e-9);
    }
}

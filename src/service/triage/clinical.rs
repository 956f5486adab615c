//! Clinical-condition model: first matching tier wins, RED down to BLUE

use super::bands::recorded;
use super::{Assessment, TriageInput};
use crate::model::TriageLevel;

pub(super) fn assess(input: &TriageInput<'_>) -> Assessment {
    let vitals = input.vitals;
    let complaint = input.symptoms.to_lowercase();

    let hr = recorded(vitals.heart_rate_bpm);
    let sbp = recorded(vitals.systolic_bp);
    let temp = recorded(vitals.temp_c);
    let spo2 = recorded(vitals.spo2_percent);
    let rr = recorded(vitals.resp_rate_min);
    let pain = vitals.pain_score;

    let predicted = |level| input.prediction.is_some_and(|p| p.flags(level));

    let critical_vitals = spo2.is_some_and(|s| s < 90.0)
        || sbp.is_some_and(|b| b < 90.0)
        || rr.is_some_and(|r| r <= 10.0 || r >= 30.0)
        || hr.is_some_and(|h| h <= 40.0 || h >= 140.0);

    if critical_vitals {
        return Assessment::new(TriageLevel::Red, "Critical vital instability");
    }
    if complaint.contains("severe chest pain") {
        return Assessment::new(
            TriageLevel::Red,
            "Critical presenting complaint (severe chest pain)",
        );
    }
    if predicted(TriageLevel::Red) {
        return Assessment::new(
            TriageLevel::Red,
            "External prediction flagged critical condition",
        );
    }

    let urgent_vitals = sbp.is_some_and(|b| b <= 100.0)
        || spo2.is_some_and(|s| s < 94.0)
        || temp.is_some_and(|t| t > 39.5)
        || rr.is_some_and(|r| r >= 25.0)
        || hr.is_some_and(|h| h >= 110.0)
        || pain >= 7.0;

    if urgent_vitals {
        return Assessment::new(
            TriageLevel::Yellow,
            "Urgent condition (moderate to severe deviation)",
        );
    }
    if complaint.contains("chest pain") || complaint.contains("trauma") {
        return Assessment::new(TriageLevel::Yellow, "Urgent presenting complaint");
    }
    if predicted(TriageLevel::Yellow) {
        return Assessment::new(
            TriageLevel::Yellow,
            "External prediction flagged urgent condition",
        );
    }

    let mild = temp.is_some_and(|t| t >= 38.5) || pain >= 5.0 || spo2.is_some_and(|s| s < 96.0);
    if mild {
        return Assessment::new(TriageLevel::Green, "Stable but symptomatic");
    }

    Assessment::new(TriageLevel::Blue, "Normal condition")
}

//! Special-population escalation for the weighted-tier model
//!
//! Rules only ever raise the level. Each rule that fires adds its own reason.

use super::{Assessment, TriageInput};
use crate::model::TriageLevel;

/// Three months, in years
const INFANT_AGE_YEARS: f64 = 0.25;
const ELDERLY_AGE_YEARS: f64 = 65.0;
const FEVER_C: f64 = 38.0;

pub(super) fn apply(assessment: &mut Assessment, input: &TriageInput<'_>) {
    let text = context_text(input);
    let age = input.age_years;

    if age.is_some_and(|a| a < 0.0) {
        assessment.note("Invalid date of birth");
    }

    let infant = age.is_some_and(|a| (0.0..INFANT_AGE_YEARS).contains(&a));
    if infant && input.vitals.temp_c >= FEVER_C {
        assessment.escalate(TriageLevel::Yellow, "Infant <3 months with fever");
    }

    if is_female(input.sex) && text.contains("pregnan") {
        if text.contains("bleed") {
            assessment.escalate(TriageLevel::Red, "Pregnancy with bleeding");
        } else if text.contains("abdominal") {
            assessment.escalate(TriageLevel::Yellow, "Pregnancy with abdominal pain");
        } else if text.contains("fetal") && text.contains("movement") {
            assessment.escalate(TriageLevel::Yellow, "Decreased fetal movement");
        }
    }

    if age.is_some_and(|a| a >= ELDERLY_AGE_YEARS) && text.contains("confusion") {
        assessment.escalate(TriageLevel::Yellow, "Elderly with confusion");
    }

    if text.contains("immuno") && text.contains("fever") {
        assessment.escalate(TriageLevel::Yellow, "Immunocompromised with fever");
    }

    if let Some(prediction) = input.prediction {
        if prediction.flags(TriageLevel::Red) {
            assessment.escalate(
                TriageLevel::Red,
                "External prediction flagged critical condition",
            );
        } else if prediction.flags(TriageLevel::Yellow) {
            assessment.escalate(
                TriageLevel::Yellow,
                "External prediction flagged urgent condition",
            );
        }
    }
}

/// Symptoms and the intake indicator, lower-cased, as one searchable string
fn context_text(input: &TriageInput<'_>) -> String {
    let mut text = input.symptoms.to_lowercase();
    if let Some(indicator) = input.indicator {
        text.push(' ');
        text.push_str(&indicator.to_lowercase());
    }
    text
}

fn is_female(sex: Option<&str>) -> bool {
    sex.map(str::trim)
        .is_some_and(|s| s.eq_ignore_ascii_case("female") || s.eq_ignore_ascii_case("f"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PredictionResult, VitalSigns};

    fn vitals_with_temp(temp_c: f64) -> VitalSigns {
        VitalSigns {
            heart_rate_bpm: 80.0,
            systolic_bp: 118.0,
            diastolic_bp: 76.0,
            temp_c,
            spo2_percent: 98.0,
            resp_rate_min: 16.0,
            pain_score: 0.0,
            gcs_total: None,
        }
    }

    fn run(base: TriageLevel, input: &TriageInput<'_>) -> Assessment {
        let mut assessment = Assessment::new(base, "base");
        apply(&mut assessment, input);
        assessment
    }

    #[test]
    fn test_infant_with_fever() {
        let vitals = vitals_with_temp(38.2);
        let input = TriageInput {
            age_years: Some(0.1),
            ..TriageInput::vitals(&vitals)
        };
        let assessment = run(TriageLevel::Green, &input);
        assert_eq!(assessment.level, TriageLevel::Yellow);
        assert_eq!(assessment.reasons[1], "Infant <3 months with fever");
    }

    #[test]
    fn test_unknown_age_is_not_an_infant() {
        let vitals = vitals_with_temp(38.2);
        let assessment = run(TriageLevel::Blue, &TriageInput::vitals(&vitals));
        assert_eq!(assessment.level, TriageLevel::Blue);
        assert_eq!(assessment.reasons.len(), 1);
    }

    #[test]
    fn test_pregnancy_rules() {
        let vitals = vitals_with_temp(37.0);
        let cases = [
            ("pregnant, vaginal bleeding", TriageLevel::Red, "Pregnancy with bleeding"),
            ("pregnant with abdominal cramps", TriageLevel::Yellow, "Pregnancy with abdominal pain"),
            ("pregnancy, less fetal movement", TriageLevel::Yellow, "Decreased fetal movement"),
        ];
        for (symptoms, level, reason) in cases {
            let input = TriageInput {
                symptoms,
                sex: Some("Female"),
                ..TriageInput::vitals(&vitals)
            };
            let assessment = run(TriageLevel::Blue, &input);
            assert_eq!(assessment.level, level, "{}", symptoms);
            assert_eq!(assessment.reasons.last().unwrap(), reason);
        }
    }

    #[test]
    fn test_pregnancy_from_indicator() {
        let vitals = vitals_with_temp(37.0);
        let input = TriageInput {
            symptoms: "bleeding",
            sex: Some("female"),
            indicator: Some("Pregnant"),
            ..TriageInput::vitals(&vitals)
        };
        assert_eq!(run(TriageLevel::Green, &input).level, TriageLevel::Red);
    }

    #[test]
    fn test_pregnancy_rules_require_female() {
        let vitals = vitals_with_temp(37.0);
        let input = TriageInput {
            symptoms: "pregnant, bleeding",
            sex: Some("Male"),
            ..TriageInput::vitals(&vitals)
        };
        assert_eq!(run(TriageLevel::Blue, &input).level, TriageLevel::Blue);
    }

    #[test]
    fn test_elderly_confusion() {
        let vitals = vitals_with_temp(37.0);
        let input = TriageInput {
            symptoms: "new confusion since morning",
            age_years: Some(78.4),
            ..TriageInput::vitals(&vitals)
        };
        assert_eq!(run(TriageLevel::Blue, &input).level, TriageLevel::Yellow);

        let younger = TriageInput {
            age_years: Some(40.0),
            ..input
        };
        assert_eq!(run(TriageLevel::Blue, &younger).level, TriageLevel::Blue);
    }

    #[test]
    fn test_immunocompromised_fever() {
        let vitals = vitals_with_temp(37.0);
        let input = TriageInput {
            symptoms: "fever for two days",
            indicator: Some("Immunocompromised"),
            ..TriageInput::vitals(&vitals)
        };
        let assessment = run(TriageLevel::Green, &input);
        assert_eq!(assessment.level, TriageLevel::Yellow);
        assert_eq!(assessment.reasons[1], "Immunocompromised with fever");
    }

    #[test]
    fn test_escalation_never_lowers_level() {
        let vitals = vitals_with_temp(38.5);
        let input = TriageInput {
            symptoms: "immunosuppressed, fever, confusion",
            age_years: Some(80.0),
            ..TriageInput::vitals(&vitals)
        };
        let assessment = run(TriageLevel::Orange, &input);
        assert_eq!(assessment.level, TriageLevel::Orange);
        assert_eq!(
            assessment.reasons,
            vec![
                "base".to_string(),
                "Elderly with confusion".to_string(),
                "Immunocompromised with fever".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_age_noted_without_change() {
        let vitals = vitals_with_temp(39.0);
        let input = TriageInput {
            age_years: Some(-2.0),
            ..TriageInput::vitals(&vitals)
        };
        let assessment = run(TriageLevel::Green, &input);
        assert_eq!(assessment.level, TriageLevel::Green);
        assert_eq!(assessment.reasons[1], "Invalid date of birth");
    }

    #[test]
    fn test_prediction_hint_escalates() {
        let vitals = vitals_with_temp(37.0);
        let prediction = PredictionResult {
            triage_level: Some("RED".to_string()),
            ..PredictionResult::default()
        };
        let input = TriageInput {
            prediction: Some(&prediction),
            ..TriageInput::vitals(&vitals)
        };
        let assessment = run(TriageLevel::Blue, &input);
        assert_eq!(assessment.level, TriageLevel::Red);
        assert_eq!(
            assessment.reasons[1],
            "External prediction flagged critical condition"
        );
    }
}

//! Feature Encoder - RawReport → FeatureVector
//!
//! Copies the six numeric fields verbatim and expands each categorical field
//! into its one-hot group. Pure and total over `RawReport`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;
use super::vector::FeatureVector;
use crate::models::{
    ChestPainType, ExerciseAngina, LabelledReport, RawReport, RestingEcg, Sex, StSlope,
};

// Slot indices, see FEATURE_LAYOUT
const SEX_F: usize = 6;
const SEX_M: usize = 7;
const CHEST_PAIN_ASY: usize = 8;
const CHEST_PAIN_ATA: usize = 9;
const CHEST_PAIN_NAP: usize = 10;
const CHEST_PAIN_TA: usize = 11;
const RESTING_ECG_LVH: usize = 12;
const RESTING_ECG_NORMAL: usize = 13;
const RESTING_ECG_ST: usize = 14;
const EXERCISE_ANGINA_N: usize = 15;
const EXERCISE_ANGINA_Y: usize = 16;
const ST_SLOPE_DOWN: usize = 17;
const ST_SLOPE_FLAT: usize = 18;
const ST_SLOPE_UP: usize = 19;

/// How a NORMAL resting ECG is placed in the vector.
///
/// The deployed forest was trained on vectors where the form's "NORMAL"
/// never matched the "Normal" column, so every normal ECG was encoded as
/// ST. `Legacy` keeps feeding it that way; `Canonical` sets
/// `RestingECG_Normal` and needs an artifact trained on the corrected
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcgEncoding {
    #[default]
    Legacy,
    Canonical,
}

impl FromStr for EcgEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "canonical" => Ok(Self::Canonical),
            other => Err(format!("unknown resting ECG encoding `{}` (expected legacy or canonical)", other)),
        }
    }
}

/// Encode a validated report into the classifier's input vector
pub fn encode(report: &RawReport, ecg: EcgEncoding) -> FeatureVector {
    let mut values = [0.0f64; FEATURE_COUNT];

    values[0] = report.age as f64;
    values[1] = report.resting_bp as f64;
    values[2] = report.cholesterol as f64;
    values[3] = f64::from(report.fasting_bs);
    values[4] = report.max_hr as f64;
    values[5] = report.old_peak;

    let sex = match report.sex {
        Sex::M => SEX_M,
        Sex::F => SEX_F,
    };

    let chest_pain = match report.chest_pain_type {
        ChestPainType::Asy => CHEST_PAIN_ASY,
        ChestPainType::Ata => CHEST_PAIN_ATA,
        ChestPainType::Nap => CHEST_PAIN_NAP,
        ChestPainType::Ta => CHEST_PAIN_TA,
    };

    let resting_ecg = match (report.resting_ecg, ecg) {
        (RestingEcg::Lvh, _) => RESTING_ECG_LVH,
        (RestingEcg::Normal, EcgEncoding::Canonical) => RESTING_ECG_NORMAL,
        (RestingEcg::Normal, EcgEncoding::Legacy) => RESTING_ECG_ST,
        (RestingEcg::St, _) => RESTING_ECG_ST,
    };

    let exercise_angina = match report.exercise_angina {
        ExerciseAngina::Y => EXERCISE_ANGINA_Y,
        ExerciseAngina::N => EXERCISE_ANGINA_N,
    };

    let st_slope = match report.st_slope {
        StSlope::Up => ST_SLOPE_UP,
        StSlope::Down => ST_SLOPE_DOWN,
        StSlope::Flat => ST_SLOPE_FLAT,
    };

    for slot in [sex, chest_pain, resting_ecg, exercise_angina, st_slope] {
        values[slot] = 1.0;
    }

    FeatureVector::from_values(values)
}

/// Encode a report whose categorical fields are raw labels.
///
/// Unknown labels take their field's default branch instead of failing.
pub fn encode_labels(report: &LabelledReport, ecg: EcgEncoding) -> FeatureVector {
    encode(&report.to_report_lenient(), ecg)
}

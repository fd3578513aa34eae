//! Patient report model
//!
//! `RawReport` is the validated set of eleven measurements the form collects.
//! Every categorical field is a closed enum; the form layer parses labels
//! strictly, `LabelledReport` offers the lenient string mapping instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A label that isn't one of a field's choices
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{value}` is not a valid choice for {field}")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
}

impl UnknownChoice {
    fn new(field: &'static str, value: &str) -> Self {
        Self { field, value: value.to_string() }
    }
}

// ============================================================================
// CATEGORICAL FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub const FORM_CHOICES: &'static [&'static str] = &["M", "F"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }

    /// Anything other than "M" is treated as female.
    pub fn from_label_lenient(label: &str) -> Self {
        if label == "M" { Self::M } else { Self::F }
    }
}

impl FromStr for Sex {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Self::M),
            "F" => Ok(Self::F),
            other => Err(UnknownChoice::new("sex", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestPainType {
    /// Atypical angina
    Ata,
    /// Typical angina
    Ta,
    /// Non-anginal pain
    Nap,
    /// Asymptomatic
    Asy,
}

impl ChestPainType {
    pub const FORM_CHOICES: &'static [&'static str] = &["ATA", "TA", "NAP", "ASY"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ata => "ATA",
            Self::Ta => "TA",
            Self::Nap => "NAP",
            Self::Asy => "ASY",
        }
    }

    /// Unknown labels fall to typical angina.
    pub fn from_label_lenient(label: &str) -> Self {
        match label {
            "ASY" => Self::Asy,
            "ATA" => Self::Ata,
            "NAP" => Self::Nap,
            _ => Self::Ta,
        }
    }
}

impl FromStr for ChestPainType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATA" => Ok(Self::Ata),
            "TA" => Ok(Self::Ta),
            "NAP" => Ok(Self::Nap),
            "ASY" => Ok(Self::Asy),
            other => Err(UnknownChoice::new("chestPainType", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestingEcg {
    Normal,
    /// ST-T wave abnormality
    St,
    /// Left ventricular hypertrophy
    Lvh,
}

impl RestingEcg {
    /// LVH is a valid reading but the form never offers it.
    pub const FORM_CHOICES: &'static [&'static str] = &["NORMAL", "ST"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::St => "ST",
            Self::Lvh => "LVH",
        }
    }

    /// Case-sensitive: only "Normal" maps to `Normal`, so the form's
    /// "NORMAL" lands on `St` along with every other unknown label.
    pub fn from_label_lenient(label: &str) -> Self {
        match label {
            "LVH" => Self::Lvh,
            "Normal" => Self::Normal,
            _ => Self::St,
        }
    }
}

impl FromStr for RestingEcg {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "ST" => Ok(Self::St),
            "LVH" => Ok(Self::Lvh),
            other => Err(UnknownChoice::new("restingECG", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseAngina {
    Y,
    N,
}

impl ExerciseAngina {
    pub const FORM_CHOICES: &'static [&'static str] = &["Y", "N"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Y => "Y",
            Self::N => "N",
        }
    }

    pub fn from_label_lenient(label: &str) -> Self {
        if label == "Y" { Self::Y } else { Self::N }
    }
}

impl FromStr for ExerciseAngina {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Y" => Ok(Self::Y),
            "N" => Ok(Self::N),
            other => Err(UnknownChoice::new("exerciseAngina", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StSlope {
    Up,
    Flat,
    Down,
}

impl StSlope {
    pub const FORM_CHOICES: &'static [&'static str] = &["Up", "Flat", "Down"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Flat => "Flat",
            Self::Down => "Down",
        }
    }

    /// Unknown labels fall to flat.
    pub fn from_label_lenient(label: &str) -> Self {
        match label {
            "Up" => Self::Up,
            "Down" => Self::Down,
            _ => Self::Flat,
        }
    }
}

impl FromStr for StSlope {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Up" => Ok(Self::Up),
            "Flat" => Ok(Self::Flat),
            "Down" => Ok(Self::Down),
            other => Err(UnknownChoice::new("st_slope", other)),
        }
    }
}

macro_rules! impl_display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

impl_display_label!(Sex, ChestPainType, RestingEcg, ExerciseAngina, StSlope);

// ============================================================================
// REPORTS
// ============================================================================

/// Validated clinical measurements for one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub age: i64,
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    pub resting_bp: i64,
    pub cholesterol: i64,
    /// 0 or 1
    pub fasting_bs: u8,
    pub resting_ecg: RestingEcg,
    pub max_hr: i64,
    pub exercise_angina: ExerciseAngina,
    pub old_peak: f64,
    pub st_slope: StSlope,
}

/// A report whose categorical fields are still raw labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledReport {
    pub age: i64,
    pub sex: String,
    pub chest_pain_type: String,
    pub resting_bp: i64,
    pub cholesterol: i64,
    pub fasting_bs: u8,
    pub resting_ecg: String,
    pub max_hr: i64,
    pub exercise_angina: String,
    pub old_peak: f64,
    pub st_slope: String,
}

impl LabelledReport {
    /// Map every label through its default branch. Never fails, but an
    /// unrecognised label silently becomes that field's fallback category.
    pub fn to_report_lenient(&self) -> RawReport {
        RawReport {
            age: self.age,
            sex: Sex::from_label_lenient(&self.sex),
            chest_pain_type: ChestPainType::from_label_lenient(&self.chest_pain_type),
            resting_bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fasting_bs: self.fasting_bs,
            resting_ecg: RestingEcg::from_label_lenient(&self.resting_ecg),
            max_hr: self.max_hr,
            exercise_angina: ExerciseAngina::from_label_lenient(&self.exercise_angina),
            old_peak: self.old_peak,
            st_slope: StSlope::from_label_lenient(&self.st_slope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_choices_parse_and_round_trip_labels() {
        for label in Sex::FORM_CHOICES {
            assert_eq!(label.parse::<Sex>().unwrap().label(), *label);
        }
        for label in ChestPainType::FORM_CHOICES {
            assert_eq!(label.parse::<ChestPainType>().unwrap().label(), *label);
        }
        for label in RestingEcg::FORM_CHOICES {
            assert_eq!(label.parse::<RestingEcg>().unwrap().label(), *label);
        }
        for label in ExerciseAngina::FORM_CHOICES {
            assert_eq!(label.parse::<ExerciseAngina>().unwrap().label(), *label);
        }
        for label in StSlope::FORM_CHOICES {
            assert_eq!(label.parse::<StSlope>().unwrap().label(), *label);
        }
    }

    #[test]
    fn test_strict_parse_is_case_sensitive() {
        assert_eq!(
            "Normal".parse::<RestingEcg>(),
            Err(UnknownChoice { field: "restingECG", value: "Normal".to_string() })
        );
        assert!("m".parse::<Sex>().is_err());
        assert!("up".parse::<StSlope>().is_err());
        assert_eq!("LVH".parse::<RestingEcg>(), Ok(RestingEcg::Lvh));
    }

    #[test]
    fn test_lenient_defaults() {
        assert_eq!(Sex::from_label_lenient("X"), Sex::F);
        assert_eq!(ChestPainType::from_label_lenient("TA"), ChestPainType::Ta);
        assert_eq!(ChestPainType::from_label_lenient("??"), ChestPainType::Ta);
        assert_eq!(RestingEcg::from_label_lenient("NORMAL"), RestingEcg::St);
        assert_eq!(RestingEcg::from_label_lenient("Normal"), RestingEcg::Normal);
        assert_eq!(ExerciseAngina::from_label_lenient("yes"), ExerciseAngina::N);
        assert_eq!(StSlope::from_label_lenient("Flat"), StSlope::Flat);
        assert_eq!(StSlope::from_label_lenient(""), StSlope::Flat);
    }

    #[test]
    fn test_display_uses_form_label() {
        assert_eq!(RestingEcg::Normal.to_string(), "NORMAL");
        assert_eq!(ChestPainType::Asy.to_string(), "ASY");
    }
}

//! Heart data form - input collection and validation
//!
//! The browser posts every field as text. Validation parses each one into
//! its typed form, range-checks the numbers with `validator`, and either
//! yields a `RawReport` or the per-field messages to show next to the form.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::report::{ChestPainType, ExerciseAngina, RawReport, RestingEcg, Sex, StSlope};

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_INTEGER: &str = "Not a valid integer value.";
pub const MSG_INVALID_DECIMAL: &str = "Not a valid decimal value.";
pub const MSG_INVALID_CHOICE: &str = "Not a valid choice.";

const FASTING_BS_CHOICES: &[&str] = &["1", "0"];

// ============================================================================
// FIELD TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    Select(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Name of the form control
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Form controls in display order
pub const FORM_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "age", label: "Age", kind: FieldKind::Integer },
    FieldSpec { name: "sex", label: "Sex", kind: FieldKind::Select(Sex::FORM_CHOICES) },
    FieldSpec { name: "chestPainType", label: "Chest Pain Type", kind: FieldKind::Select(ChestPainType::FORM_CHOICES) },
    FieldSpec { name: "restingBP", label: "Resting Blood pressure", kind: FieldKind::Integer },
    FieldSpec { name: "cholesterol", label: "Serum Cholesterol", kind: FieldKind::Integer },
    FieldSpec { name: "fastingBS", label: "Fasting Blood Sugar", kind: FieldKind::Select(FASTING_BS_CHOICES) },
    FieldSpec { name: "restingECG", label: "Resting ECG", kind: FieldKind::Select(RestingEcg::FORM_CHOICES) },
    FieldSpec { name: "maxHR", label: "Maximum Heart Rate", kind: FieldKind::Integer },
    FieldSpec { name: "exerciseAngina", label: "Exercise Angina", kind: FieldKind::Select(ExerciseAngina::FORM_CHOICES) },
    FieldSpec { name: "old_peak", label: "Oldpeak", kind: FieldKind::Decimal },
    FieldSpec { name: "st_slope", label: "ST Slope", kind: FieldKind::Select(StSlope::FORM_CHOICES) },
];

// ============================================================================
// SUBMITTED FORM
// ============================================================================

/// Raw form submission, every control as posted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartForm {
    pub age: String,
    pub sex: String,
    #[serde(rename = "chestPainType")]
    pub chest_pain_type: String,
    #[serde(rename = "restingBP")]
    pub resting_bp: String,
    pub cholesterol: String,
    #[serde(rename = "fastingBS")]
    pub fasting_bs: String,
    #[serde(rename = "restingECG")]
    pub resting_ecg: String,
    #[serde(rename = "maxHR")]
    pub max_hr: String,
    #[serde(rename = "exerciseAngina")]
    pub exercise_angina: String,
    pub old_peak: String,
    pub st_slope: String,
}

/// Numeric fields after parsing, checked by `validator`
///
/// Fields that failed to parse are `None` and skipped, so the others are
/// still range-checked.
#[derive(Debug, Validate)]
struct Measurements {
    #[validate(range(min = 1, max = 150, message = "Number must be between 1 and 150."))]
    age: Option<i64>,
    #[validate(range(min = 1, message = "Number must be at least 1."))]
    resting_bp: Option<i64>,
    #[validate(range(min = 1, message = "Number must be at least 1."))]
    cholesterol: Option<i64>,
    #[validate(range(min = 60, max = 202, message = "Number must be between 60 and 202."))]
    max_hr: Option<i64>,
}

/// Validation messages keyed by form control name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl HeartForm {
    /// Submitted value of a control, by form name
    pub fn value(&self, name: &str) -> &str {
        match name {
            "age" => &self.age,
            "sex" => &self.sex,
            "chestPainType" => &self.chest_pain_type,
            "restingBP" => &self.resting_bp,
            "cholesterol" => &self.cholesterol,
            "fastingBS" => &self.fasting_bs,
            "restingECG" => &self.resting_ecg,
            "maxHR" => &self.max_hr,
            "exerciseAngina" => &self.exercise_angina,
            "old_peak" => &self.old_peak,
            "st_slope" => &self.st_slope,
            _ => "",
        }
    }

    /// Validate every field, collecting all messages before giving up
    pub fn validate_report(&self) -> Result<RawReport, FormErrors> {
        let mut errors = FormErrors::default();

        let age = required_integer(&self.age, "age", &mut errors);
        let resting_bp = required_integer(&self.resting_bp, "restingBP", &mut errors);
        let cholesterol = required_integer(&self.cholesterol, "cholesterol", &mut errors);
        let max_hr = required_integer(&self.max_hr, "maxHR", &mut errors);
        let old_peak = required_decimal(&self.old_peak, "old_peak", &mut errors);

        let sex = choice::<Sex>(&self.sex, "sex", Sex::FORM_CHOICES, &mut errors);
        let chest_pain_type = choice::<ChestPainType>(
            &self.chest_pain_type, "chestPainType", ChestPainType::FORM_CHOICES, &mut errors,
        );
        let fasting_bs = choice::<u8>(&self.fasting_bs, "fastingBS", FASTING_BS_CHOICES, &mut errors);
        let resting_ecg = choice::<RestingEcg>(
            &self.resting_ecg, "restingECG", RestingEcg::FORM_CHOICES, &mut errors,
        );
        let exercise_angina = choice::<ExerciseAngina>(
            &self.exercise_angina, "exerciseAngina", ExerciseAngina::FORM_CHOICES, &mut errors,
        );
        let st_slope = choice::<StSlope>(&self.st_slope, "st_slope", StSlope::FORM_CHOICES, &mut errors);

        let measurements = Measurements { age, resting_bp, cholesterol, max_hr };
        if let Err(failures) = measurements.validate() {
            for (field, field_errors) in failures.field_errors() {
                let field: &str = field.as_ref();
                let Some(name) = form_name(field) else { continue };
                for error in field_errors.iter() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    errors.add(name, message);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        match (
            age, sex, chest_pain_type, resting_bp, cholesterol, fasting_bs,
            resting_ecg, max_hr, exercise_angina, old_peak, st_slope,
        ) {
            (
                Some(age), Some(sex), Some(chest_pain_type), Some(resting_bp), Some(cholesterol),
                Some(fasting_bs), Some(resting_ecg), Some(max_hr), Some(exercise_angina),
                Some(old_peak), Some(st_slope),
            ) => Ok(RawReport {
                age,
                sex,
                chest_pain_type,
                resting_bp,
                cholesterol,
                fasting_bs,
                resting_ecg,
                max_hr,
                exercise_angina,
                old_peak,
                st_slope,
            }),
            // Every `None` above recorded a message
            _ => Err(errors),
        }
    }
}

impl From<&RawReport> for HeartForm {
    fn from(report: &RawReport) -> Self {
        Self {
            age: report.age.to_string(),
            sex: report.sex.label().to_string(),
            chest_pain_type: report.chest_pain_type.label().to_string(),
            resting_bp: report.resting_bp.to_string(),
            cholesterol: report.cholesterol.to_string(),
            fasting_bs: report.fasting_bs.to_string(),
            resting_ecg: report.resting_ecg.label().to_string(),
            max_hr: report.max_hr.to_string(),
            exercise_angina: report.exercise_angina.label().to_string(),
            old_peak: report.old_peak.to_string(),
            st_slope: report.st_slope.label().to_string(),
        }
    }
}

fn form_name(field: &str) -> Option<&'static str> {
    match field {
        "age" => Some("age"),
        "resting_bp" => Some("restingBP"),
        "cholesterol" => Some("cholesterol"),
        "max_hr" => Some("maxHR"),
        _ => None,
    }
}

/// Blank and zero both count as missing. Unparseable text is reported as
/// invalid and then as missing, since it leaves no value behind.
fn required_integer(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }

    match raw.parse::<i64>() {
        Ok(0) => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, MSG_INVALID_INTEGER);
            errors.add(field, MSG_REQUIRED);
            None
        }
    }
}

fn required_decimal(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.add(field, MSG_INVALID_DECIMAL);
            None
        }
    }
}

fn choice<T: FromStr>(
    raw: &str,
    field: &'static str,
    choices: &[&str],
    errors: &mut FormErrors,
) -> Option<T> {
    if !choices.contains(&raw) {
        errors.add(field, MSG_INVALID_CHOICE);
        return None;
    }

    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, MSG_INVALID_CHOICE);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> HeartForm {
        HeartForm {
            age: "54".into(),
            sex: "M".into(),
            chest_pain_type: "ATA".into(),
            resting_bp: "130".into(),
            cholesterol: "250".into(),
            fasting_bs: "0".into(),
            resting_ecg: "NORMAL".into(),
            max_hr: "150".into(),
            exercise_angina: "N".into(),
            old_peak: "1.5".into(),
            st_slope: "Flat".into(),
        }
    }

    fn age_errors(age: &str) -> Vec<String> {
        let form = HeartForm { age: age.into(), ..valid_form() };
        match form.validate_report() {
            Ok(_) => Vec::new(),
            Err(errors) => errors.for_field("age").to_vec(),
        }
    }

    #[test]
    fn test_valid_form_produces_report() {
        let report = valid_form().validate_report().unwrap();

        assert_eq!(report.age, 54);
        assert_eq!(report.sex, Sex::M);
        assert_eq!(report.chest_pain_type, ChestPainType::Ata);
        assert_eq!(report.fasting_bs, 0);
        assert_eq!(report.resting_ecg, RestingEcg::Normal);
        assert_eq!(report.old_peak, 1.5);
        assert_eq!(report.st_slope, StSlope::Flat);
    }

    #[test]
    fn test_age_boundaries() {
        assert!(age_errors("1").is_empty());
        assert!(age_errors("150").is_empty());
        assert_eq!(age_errors("151"), vec!["Number must be between 1 and 150."]);
        assert_eq!(age_errors("-3"), vec!["Number must be between 1 and 150."]);
        assert_eq!(age_errors("0"), vec![MSG_REQUIRED]);
        assert_eq!(age_errors("200"), vec!["Number must be between 1 and 150."]);
    }

    #[test]
    fn test_max_hr_boundaries() {
        for (value, ok) in [("60", true), ("202", true), ("59", false), ("203", false)] {
            let form = HeartForm { max_hr: value.into(), ..valid_form() };
            let result = form.validate_report();
            assert_eq!(result.is_ok(), ok, "maxHR={}", value);
            if let Err(errors) = result {
                assert_eq!(errors.for_field("maxHR"), ["Number must be between 60 and 202."]);
            }
        }
    }

    #[test]
    fn test_lower_bound_only_fields() {
        let form = HeartForm { resting_bp: "-1".into(), cholesterol: "1".into(), ..valid_form() };
        let errors = form.validate_report().unwrap_err();

        assert_eq!(errors.for_field("restingBP"), ["Number must be at least 1."]);
        assert!(!errors.contains("cholesterol"));
    }

    #[test]
    fn test_missing_fields_are_required() {
        let errors = HeartForm::default().validate_report().unwrap_err();

        for field in FORM_FIELDS {
            assert!(errors.contains(field.name), "no error for {}", field.name);
        }
        assert_eq!(errors.for_field("age"), [MSG_REQUIRED]);
        assert_eq!(errors.for_field("old_peak"), [MSG_REQUIRED]);
        assert_eq!(errors.for_field("sex"), [MSG_INVALID_CHOICE]);
        assert_eq!(errors.len(), FORM_FIELDS.len());
    }

    #[test]
    fn test_unparseable_numbers() {
        let form = HeartForm {
            cholesterol: "high".into(),
            old_peak: "1,5".into(),
            ..valid_form()
        };
        let errors = form.validate_report().unwrap_err();

        assert_eq!(errors.for_field("cholesterol"), [MSG_INVALID_INTEGER, MSG_REQUIRED]);
        assert_eq!(errors.for_field("old_peak"), [MSG_INVALID_DECIMAL]);

        let form = HeartForm { old_peak: "NaN".into(), ..valid_form() };
        assert_eq!(form.validate_report().unwrap_err().for_field("old_peak"), [MSG_INVALID_DECIMAL]);
    }

    #[test]
    fn test_range_checked_when_another_number_is_missing() {
        let form = HeartForm { age: "".into(), max_hr: "300".into(), ..valid_form() };
        let errors = form.validate_report().unwrap_err();

        assert_eq!(errors.for_field("age"), [MSG_REQUIRED]);
        assert_eq!(errors.for_field("maxHR"), ["Number must be between 60 and 202."]);

        let form = HeartForm { cholesterol: "x".into(), resting_bp: "-5".into(), ..valid_form() };
        let errors = form.validate_report().unwrap_err();

        assert_eq!(errors.for_field("cholesterol"), [MSG_INVALID_INTEGER, MSG_REQUIRED]);
        assert_eq!(errors.for_field("restingBP"), ["Number must be at least 1."]);
    }

    #[test]
    fn test_old_peak_is_unconstrained() {
        let form = HeartForm { old_peak: "-2.6".into(), ..valid_form() };
        assert_eq!(form.validate_report().unwrap().old_peak, -2.6);
    }

    #[test]
    fn test_choices_outside_the_form_are_rejected() {
        let form = HeartForm {
            resting_ecg: "LVH".into(),
            st_slope: "up".into(),
            fasting_bs: "2".into(),
            ..valid_form()
        };
        let errors = form.validate_report().unwrap_err();

        assert_eq!(errors.for_field("restingECG"), [MSG_INVALID_CHOICE]);
        assert_eq!(errors.for_field("st_slope"), [MSG_INVALID_CHOICE]);
        assert_eq!(errors.for_field("fastingBS"), [MSG_INVALID_CHOICE]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_fasting_bs_converted_to_integer() {
        let form = HeartForm { fasting_bs: "1".into(), ..valid_form() };
        assert_eq!(form.validate_report().unwrap().fasting_bs, 1);
    }

    #[test]
    fn test_form_round_trips_through_report() {
        let report = valid_form().validate_report().unwrap();
        let form = HeartForm::from(&report);

        assert_eq!(form.value("restingECG"), "NORMAL");
        assert_eq!(form.validate_report().unwrap(), report);
    }
}

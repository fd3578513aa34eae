//! Predictor - classifier invocation and result formatting

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::features::{encode, EcgEncoding, FeatureVector};
use crate::models::RawReport;
use super::forest::ModelInfo;

pub const NO_DISEASE_MESSAGE: &str = "The patient does not have a heart disease";
pub const DISEASE_MESSAGE_PREFIX: &str = "The patient have a heart disease, and the chances are ";

/// Allowed drift of p0 + p1 away from 1
const PROBABILITY_TOLERANCE: f64 = 1e-6;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A trained binary classifier over the 20-slot feature vector
pub trait Classifier: Send + Sync {
    /// Predicted class label; 0 and 1 are the only meaningful ones
    fn classify(&self, features: &FeatureVector) -> i64;

    /// `(p0, p1)` for classes 0 and 1
    fn class_probabilities(&self, features: &FeatureVector) -> (f64, f64);

    fn model_info(&self) -> Option<&ModelInfo> {
        None
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("classifier returned unexpected class {0}")]
    UnexpectedClass(i64),

    #[error("classifier returned invalid probabilities ({p0}, {p1})")]
    InvalidProbabilities { p0: f64, p1: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PredictionResult {
    NoDisease,
    Disease {
        /// Class-1 probability as returned by the classifier
        probability: f64,
        /// `round(probability, 2) * 100`
        chances: f64,
    },
}

impl PredictionResult {
    pub fn from_probability(probability: f64) -> Self {
        Self::Disease {
            probability,
            chances: round_hundredths(probability) * 100.0,
        }
    }

    pub fn has_disease(&self) -> bool {
        matches!(self, Self::Disease { .. })
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDisease => f.write_str(NO_DISEASE_MESSAGE),
            // Debug keeps the ".0" on whole numbers: 86.0, not 86
            Self::Disease { chances, .. } => write!(f, "{}{:?} %", DISEASE_MESSAGE_PREFIX, chances),
        }
    }
}

/// Round to two decimals, halves going to the even neighbour.
///
/// Works on the exact binary value, so 0.865 (stored as 0.86499…) rounds
/// down. An exact tie needs the value to be an odd multiple of 1/8.
pub fn round_hundredths(value: f64) -> f64 {
    let eighths = value * 8.0;
    if eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let hundredths = value * 100.0;
        let lower = hundredths.floor();
        let even = if lower % 2.0 == 0.0 { lower } else { lower + 1.0 };
        return even / 100.0;
    }

    format!("{:.2}", value).parse().unwrap_or(value)
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Shared, read-only prediction service
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    ecg_encoding: EcgEncoding,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>, ecg_encoding: EcgEncoding) -> Self {
        Self { classifier, ecg_encoding }
    }

    pub fn ecg_encoding(&self) -> EcgEncoding {
        self.ecg_encoding
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.classifier.model_info()
    }

    /// Encode a report and predict on it
    pub fn predict_report(&self, report: &RawReport) -> Result<PredictionResult, PredictError> {
        let features = encode(report, self.ecg_encoding);
        tracing::trace!(features = %features.to_log_entry(), "Encoded report");
        self.predict(&features)
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();

        if !features.is_one_hot_consistent() {
            tracing::warn!(
                groups = ?features.group_sums(),
                "Feature vector breaks the one-hot groups"
            );
        }

        let label = self.classifier.classify(features);
        let (p0, p1) = self.classifier.class_probabilities(features);

        let valid = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !valid(p0) || !valid(p1) || (p0 + p1 - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PredictError::InvalidProbabilities { p0, p1 });
        }

        let result = match label {
            0 => PredictionResult::NoDisease,
            1 => PredictionResult::from_probability(p1),
            other => return Err(PredictError::UnexpectedClass(other)),
        };

        tracing::debug!(
            label,
            p1,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(result)
    }
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("ecg_encoding", &self.ecg_encoding)
            .field("model", &self.model_info().map(|m| &m.path))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::{ChestPainType, ExerciseAngina, RestingEcg, Sex, StSlope};

    /// Returns a fixed answer and remembers the last vector it saw
    struct StubClassifier {
        label: i64,
        p1: f64,
        seen: Mutex<Option<FeatureVector>>,
    }

    impl StubClassifier {
        fn new(label: i64, p1: f64) -> Self {
            Self { label, p1, seen: Default::default() }
        }
    }

    impl Classifier for StubClassifier {
        fn classify(&self, features: &FeatureVector) -> i64 {
            *self.seen.lock().unwrap() = Some(features.clone());
            self.label
        }

        fn class_probabilities(&self, _features: &FeatureVector) -> (f64, f64) {
            (1.0 - self.p1, self.p1)
        }
    }

    fn predictor(label: i64, p1: f64) -> Predictor {
        Predictor::new(Arc::new(StubClassifier::new(label, p1)), EcgEncoding::Legacy)
    }

    #[test]
    fn test_disease_message_uses_two_decimal_rounding() {
        let result = predictor(1, 0.865).predict(&FeatureVector::new()).unwrap();
        assert_eq!(
            result.message(),
            "The patient have a heart disease, and the chances are 86.0 %"
        );
    }

    #[test]
    fn test_disease_message_whole_percent() {
        let result = predictor(1, 0.73).predict(&FeatureVector::new()).unwrap();
        assert_eq!(
            result.message(),
            "The patient have a heart disease, and the chances are 73.0 %"
        );
        assert!(result.has_disease());
    }

    #[test]
    fn test_disease_message_keeps_float_artifacts() {
        // 0.29 * 100 is not exactly 29 in binary
        let result = predictor(1, 0.29).predict(&FeatureVector::new()).unwrap();
        assert_eq!(
            result.message(),
            "The patient have a heart disease, and the chances are 28.999999999999996 %"
        );
    }

    #[test]
    fn test_no_disease_message_has_no_probability() {
        let result = predictor(0, 0.2).predict(&FeatureVector::new()).unwrap();
        assert_eq!(result, PredictionResult::NoDisease);
        assert_eq!(result.message(), "The patient does not have a heart disease");
    }

    #[test]
    fn test_unexpected_class_is_an_error() {
        let err = predictor(2, 0.9).predict(&FeatureVector::new()).unwrap_err();
        assert_eq!(err, PredictError::UnexpectedClass(2));
    }

    #[test]
    fn test_invalid_probabilities_are_an_error() {
        let err = predictor(1, 1.5).predict(&FeatureVector::new()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidProbabilities { .. }));

        let err = predictor(1, f64::NAN).predict(&FeatureVector::new()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidProbabilities { .. }));
    }

    #[test]
    fn test_round_hundredths() {
        assert_eq!(round_hundredths(0.865), 0.86);
        assert_eq!(round_hundredths(0.73), 0.73);
        assert_eq!(round_hundredths(0.876), 0.88);
        assert_eq!(round_hundredths(0.874), 0.87);
        // exact ties go to the even hundredth
        assert_eq!(round_hundredths(0.125), 0.12);
        assert_eq!(round_hundredths(0.375), 0.38);
        assert_eq!(round_hundredths(0.625), 0.62);
        assert_eq!(round_hundredths(0.875), 0.88);
        assert_eq!(round_hundredths(1.0), 1.0);
        assert_eq!(round_hundredths(0.0), 0.0);
    }

    #[test]
    fn test_full_chances_formatting() {
        assert_eq!(PredictionResult::from_probability(1.0).to_string(), format!("{}100.0 %", DISEASE_MESSAGE_PREFIX));
        assert_eq!(PredictionResult::from_probability(0.875).to_string(), format!("{}88.0 %", DISEASE_MESSAGE_PREFIX));
    }

    #[test]
    fn test_predict_report_encodes_with_configured_ecg_mode() {
        let stub = Arc::new(StubClassifier::new(0, 0.1));
        let report = RawReport {
            age: 54,
            sex: Sex::M,
            chest_pain_type: ChestPainType::Ata,
            resting_bp: 130,
            cholesterol: 250,
            fasting_bs: 0,
            resting_ecg: RestingEcg::Normal,
            max_hr: 150,
            exercise_angina: ExerciseAngina::N,
            old_peak: 1.5,
            st_slope: StSlope::Flat,
        };

        let predictor = Predictor::new(stub.clone(), EcgEncoding::Canonical);
        predictor.predict_report(&report).unwrap();

        let seen = stub.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.get_by_name("RestingECG_Normal"), Some(1.0));
        assert_eq!(seen.get_by_name("Age"), Some(54.0));
        assert!(seen.is_one_hot_consistent());
    }

    #[test]
    fn test_vector_outside_one_hot_groups_is_still_classified() {
        let features = FeatureVector::new();
        assert!(features.group_sums().iter().all(|(_, sum)| *sum == 0.0));

        let result = predictor(1, 0.73).predict(&features).unwrap();
        assert!(result.has_disease());
    }
}

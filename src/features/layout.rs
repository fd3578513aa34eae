//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the classifier input schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The names are the column names the forest was trained on, so an exported
//! artifact can be checked against them at load time.

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Numeric (0-5) ===
    "Age",                   // 0
    "RestingBP",             // 1
    "Cholesterol",           // 2
    "FastingBS",             // 3
    "MaxHR",                 // 4
    "Oldpeak",               // 5

    // === Sex (6-7) ===
    "Sex_F",                 // 6
    "Sex_M",                 // 7

    // === Chest pain type (8-11) ===
    "ChestPainType_ASY",     // 8
    "ChestPainType_ATA",     // 9
    "ChestPainType_NAP",     // 10
    "ChestPainType_TA",      // 11

    // === Resting ECG (12-14) ===
    "RestingECG_LVH",        // 12
    "RestingECG_Normal",     // 13
    "RestingECG_ST",         // 14

    // === Exercise angina (15-16) ===
    "ExerciseAngina_N",      // 15
    "ExerciseAngina_Y",      // 16

    // === ST slope (17-19) ===
    "ST_Slope_Down",         // 17
    "ST_Slope_Flat",         // 18
    "ST_Slope_Up",           // 19
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 20;

/// Slot ranges of the one-hot indicator groups, in layout order.
pub const ONE_HOT_GROUPS: &[(&str, std::ops::Range<usize>)] = &[
    ("Sex", 6..8),
    ("ChestPainType", 8..12),
    ("RestingECG", 12..15),
    ("ExerciseAngina", 15..17),
    ("ST_Slope", 17..20),
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when an artifact's feature names don't match the layout
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutMismatchError {
    #[error("expected {expected} features, artifact declares {actual}")]
    Count { expected: usize, actual: usize },

    #[error("feature {index}: expected `{expected}`, artifact declares `{actual}`")]
    Name {
        index: usize,
        expected: &'static str,
        actual: String,
    },
}

/// Validate a list of feature names against the current layout
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    if names.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError::Count {
            expected: FEATURE_COUNT,
            actual: names.len(),
        });
    }

    for (index, (expected, actual)) in FEATURE_LAYOUT.iter().zip(names).enumerate() {
        if *expected != actual.as_ref() {
            return Err(LayoutMismatchError::Name {
                index,
                expected: *expected,
                actual: actual.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 20);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_one_hot_groups_cover_categorical_slots() {
        let mut covered: Vec<usize> = ONE_HOT_GROUPS
            .iter()
            .flat_map(|(_, range)| range.clone())
            .collect();
        covered.sort_unstable();
        assert_eq!(covered, (6..FEATURE_COUNT).collect::<Vec<_>>());

        for (prefix, range) in ONE_HOT_GROUPS {
            for index in range.clone() {
                assert!(FEATURE_LAYOUT[index].starts_with(prefix));
            }
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_feature_names_success() {
        assert!(validate_feature_names(FEATURE_LAYOUT).is_ok());
    }

    #[test]
    fn test_validate_feature_names_count_mismatch() {
        let result = validate_feature_names(&FEATURE_LAYOUT[..19]);
        assert_eq!(
            result,
            Err(LayoutMismatchError::Count { expected: 20, actual: 19 })
        );
    }

    #[test]
    fn test_validate_feature_names_order_mismatch() {
        let mut names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        names.swap(6, 7);

        match validate_feature_names(&names) {
            Err(LayoutMismatchError::Name { index, expected, actual }) => {
                assert_eq!(index, 6);
                assert_eq!(expected, "Sex_F");
                assert_eq!(actual, "Sex_M");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("Age"), Some(0));
        assert_eq!(feature_index("Oldpeak"), Some(5));
        assert_eq!(feature_index("ST_Slope_Up"), Some(19));
        assert_eq!(feature_index("nonexistent"), None);
    }
}

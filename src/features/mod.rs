//! Features Module - Feature Encoding Engine
//!
//! Turns a validated report into the fixed-order vector the forest was
//! trained on. The layout is the single source of truth for slot order.

pub mod layout;
pub mod vector;
pub mod encoder;

pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutMismatchError};
pub use vector::FeatureVector;
pub use encoder::{encode, encode_labels, EcgEncoding};

//! Data models

pub mod report;
pub mod form;

pub use report::*;
pub use form::{FieldKind, FieldSpec, FormErrors, HeartForm, FORM_FIELDS};

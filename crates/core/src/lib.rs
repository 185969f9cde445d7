//! Canonical policy document model and the normalizer that builds it from
//! raw JSON. Every scalar-or-array field comes out as an ordered list.

mod document;
mod error;
mod normalize;

pub use document::{ConditionBlock, ConditionValue, Effect, PolicyDocument, PolicyInput, PrincipalSpec, Statement};
pub use error::NormalizeError;
pub use normalize::normalize;

//! Typed, normalized generator configuration values
//!
//! Values are only built by `crate::validate` once a document conforms to
//! its schema. Plugin bodies derive `Deserialize` for that last step; the
//! top-level types implement it by running the validator.

mod condition;
mod event_types;
mod generator_types;
mod input_types;
mod output_types;

pub use condition::*;
pub use event_types::*;
pub use generator_types::*;
pub use input_types::*;
pub use output_types::*;

use serde::{de, Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Read the single entry of a one-key map such as `{alias: spec}`
pub(crate) fn one_entry<'de, D, K, V>(deserializer: D, what: &str) -> Result<(K, V), D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    let mut entries = BTreeMap::<K, V>::deserialize(deserializer)?.into_iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(de::Error::custom(format!("expected exactly one {}", what))),
    }
}

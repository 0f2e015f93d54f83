//! Serde helpers for patch types.

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field so that a present `null` becomes `Some(None)`.
///
/// Paired with `#[serde(default)]`, an absent key stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//! Tolerant deserialization for optional config keys.
//!
//! Hand-written configs get things wrong (`folder: 5`, `publish_mode: draft`).
//! A recognized optional key with an unusable value is treated as unset rather
//! than failing the whole load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::warn!(
                expected = std::any::type_name::<T>(),
                %value,
                error = %err,
                "ignoring malformed config value"
            );
            Ok(None)
        }
    }
}

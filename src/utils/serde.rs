/*!
 * Serde utilities for request payloads.
 *
 * The web client built on the chat platform's mini-app SDK sends user ids as
 * JSON numbers while the manual fallback path sends them as strings. These
 * helpers accept both.
 */

use serde::{Deserialize, Deserializer};

/// Deserialize an optional identity that may be represented as a number or string.
///
/// # Usage with serde
///
/// ```rust
/// use serde::Deserialize;
/// use todo_plus::utils::serde::deserialize_optional_identity;
///
/// #[derive(Deserialize)]
/// struct Request {
///     #[serde(default, deserialize_with = "deserialize_optional_identity")]
///     external_id: Option<String>,
/// }
/// ```
pub fn deserialize_optional_identity<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i.to_string()))
            } else if let Some(u) = n.as_u64() {
                Ok(Some(u.to_string()))
            } else {
                Err(D::Error::custom(format!("Invalid identity value: {n}")))
            }
        }
        Some(other) => Err(D::Error::custom(format!(
            "Expected string or integer identity, found: {other}"
        ))),
    }
}

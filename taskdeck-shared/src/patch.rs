/// Partial-update helpers
///
/// PATCH bodies need to tell three cases apart for nullable columns:
///
/// | JSON                | Rust                  | Meaning        |
/// |---------------------|-----------------------|----------------|
/// | key absent          | `None`                | leave unchanged |
/// | `"key": null`       | `Some(None)`          | clear          |
/// | `"key": value`      | `Some(Some(value))`   | set            |
///
/// Serde collapses the first two into `None` by default, so nullable fields
/// are declared as `Option<Option<T>>` with `#[serde(default, deserialize_with = "deserialize_some")]`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use taskdeck_shared::patch::deserialize_some;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default, deserialize_with = "deserialize_some")]
///     description: Option<Option<String>>,
/// }
///
/// let absent: Body = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.description, None);
///
/// let cleared: Body = serde_json::from_str(r#"{"description": null}"#).unwrap();
/// assert_eq!(cleared.description, Some(None));
/// ```

use serde::{Deserialize, Deserializer};

/// Wraps any present value (including `null`) in `Some`
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

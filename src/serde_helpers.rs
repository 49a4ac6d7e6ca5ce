//! Serde helpers for tolerant deserialization of panel responses.
//!
//! When the `tracing` feature is enabled, this module also logs warnings for any
//! unknown fields encountered during deserialization, helping detect API changes.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::pagination::Links;

/// Deserializes `pagination.links`.
///
/// The panel renders a populated links object as a map but an empty one as `[]`, and some
/// proxies strip it to `null`. All three decode; anything but a map yields [`Links::default`].
pub(crate) fn deserialize_links<'de, D>(deserializer: D) -> Result<Links, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        // Tried first so a sequence never lands in the struct variant's visit_seq
        #[expect(dead_code, reason = "Only the shape matters, the elements are discarded")]
        List(Vec<IgnoredAny>),
        Map {
            #[serde(default)]
            next: Option<String>,
            #[serde(default)]
            previous: Option<String>,
        },
        Null,
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Map { next, previous } => Links { next, previous },
        Repr::List(_) | Repr::Null => Links::default(),
    })
}

/// Deserialize JSON with unknown field warnings.
///
/// Unknown fields trigger warnings but do not cause deserialization to fail. A failure is
/// logged together with the JSON path and the offending value before the error is returned.
///
/// ```ignore
/// let json = serde_json::json!({ "data": [], "meta": {}, "links": {} });
/// let page: Page = deserialize_with_warnings(json)?;
/// // Logs: WARN unknown field in API response field="links"
/// ```
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(
        type_name = %type_name::<T>(),
        json = %value,
        "deserializing JSON"
    );

    // serde_ignored consumes the value; keep a copy for value lookups in the log lines
    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        let json_str = original.to_string();
        let jd = &mut serde_json::Deserializer::from_str(&json_str);
        let path_result: Result<T, _> = serde_path_to_error::deserialize(jd);
        if let Err(path_err) = path_result {
            let path = path_err.path().to_string();
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %format_value(lookup_value(&original, &path)),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %format_value(lookup_value(&original, &path)),
            "unknown field in API response"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Look up a value in a JSON structure by a `serde_ignored` / `serde_path_to_error` path.
///
/// `?` segments (Option wrappers) are skipped, numeric segments index arrays, and both
/// `items.0` and `items[0]` forms are accepted.
#[cfg(feature = "tracing")]
fn lookup_value<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    let mut current = value;

    for segment in path.split(['.', '[', ']']) {
        if segment.is_empty() || segment == "?" {
            continue;
        }

        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

#[cfg(feature = "tracing")]
fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "<unable to retrieve>".to_owned(),
    }
}

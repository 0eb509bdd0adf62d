use serde_json::{Map, Value};
use thiserror::Error;

/// Loosely-typed request body as it arrives from a client
pub type RawPayload = Map<String, Value>;

/// A client value that could not be read as its declared type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is not a valid number: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("Field '{field}' must be a whole number, got {value}")]
    NotAnInteger { field: String, value: String },

    #[error("Field '{field}' has an unsupported type")]
    UnexpectedType { field: String },
}

/// Typed, read-only view over a raw payload
///
/// Every accessor takes the list of keys a field may arrive under (the
/// snake_case and camelCase dialects) and uses the first one carrying a
/// value. Missing keys, `null` and blank strings all read as absent.
#[derive(Debug, Clone, Copy)]
pub struct RequestNormalizer<'a> {
    payload: &'a RawPayload,
}

impl<'a> RequestNormalizer<'a> {
    pub fn new(payload: &'a RawPayload) -> Self {
        Self { payload }
    }

    fn lookup(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        keys.iter().find_map(|key| match self.payload.get(*key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(value) => Some((*key, value)),
        })
    }

    /// Read a floating-point field
    pub fn float(&self, keys: &[&'static str]) -> Result<Option<f64>, ValidationError> {
        let Some((field, value)) = self.lookup(keys) else {
            return Ok(None);
        };

        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| invalid_number(field, &n.to_string())),
            Value::String(s) => parse_float(s.trim())
                .map(Some)
                .ok_or_else(|| invalid_number(field, s)),
            _ => Err(ValidationError::UnexpectedType {
                field: field.to_string(),
            }),
        }
    }

    /// Read an integer field; integral floats such as `5.0` are accepted
    pub fn int(&self, keys: &[&'static str]) -> Result<Option<i64>, ValidationError> {
        let Some((field, value)) = self.lookup(keys) else {
            return Ok(None);
        };

        let (parsed, shown) = match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => return Ok(Some(i)),
                None => (n.as_f64().filter(|v| v.is_finite()), n.to_string()),
            },
            Value::String(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(Some(i));
                }
                (parse_float(trimmed), s.clone())
            }
            _ => {
                return Err(ValidationError::UnexpectedType {
                    field: field.to_string(),
                })
            }
        };

        match parsed {
            Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
            Some(_) => Err(ValidationError::NotAnInteger {
                field: field.to_string(),
                value: shown,
            }),
            None => Err(invalid_number(field, &shown)),
        }
    }

    /// Read a free-text place name, see [`normalize_place_name`]
    pub fn place_name(&self, keys: &[&'static str]) -> Result<Option<String>, ValidationError> {
        match self.lookup(keys) {
            None => Ok(None),
            Some((_, Value::String(s))) => Ok(normalize_place_name(s)),
            Some((field, _)) => Err(ValidationError::UnexpectedType {
                field: field.to_string(),
            }),
        }
    }
}

/// Clean up a place name before it goes to the geocoder
///
/// A single trailing space is dropped when the name also has an internal
/// space ("Нижний Новгород " becomes "Нижний Новгород"). Blank names are
/// absent.
pub fn normalize_place_name(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let name = match raw.strip_suffix(' ') {
        Some(head) if head.contains(' ') => head,
        _ => raw,
    };

    Some(name.to_string())
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn invalid_number(field: &str, value: &str) -> ValidationError {
    ValidationError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_blank_and_missing_are_absent() {
        let raw = payload(json!({"area_from": "", "level_from": null, "rooms_from": "   "}));
        let n = RequestNormalizer::new(&raw);

        assert_eq!(n.float(&["area_from"]).unwrap(), None);
        assert_eq!(n.int(&["level_from"]).unwrap(), None);
        assert_eq!(n.int(&["rooms_from"]).unwrap(), None);
        assert_eq!(n.float(&["kitchen_area_from"]).unwrap(), None);
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let raw = payload(json!({"area_from": 56.5, "area_to": " 80.5 ", "level": "14", "rooms": 2.0}));
        let n = RequestNormalizer::new(&raw);

        assert_eq!(n.float(&["area_from"]).unwrap(), Some(56.5));
        assert_eq!(n.float(&["area_to"]).unwrap(), Some(80.5));
        assert_eq!(n.int(&["level"]).unwrap(), Some(14));
        assert_eq!(n.int(&["rooms"]).unwrap(), Some(2));
    }

    #[test]
    fn test_first_present_alias_wins() {
        let raw = payload(json!({"area_from": "", "totalAreaFrom": "42"}));
        let n = RequestNormalizer::new(&raw);

        assert_eq!(n.float(&["area_from", "totalAreaFrom"]).unwrap(), Some(42.0));
    }

    #[test]
    fn test_unparseable_values_fail() {
        let raw = payload(json!({"area": "big", "level": 2.5, "rooms": "3.5", "flag": true, "price": "NaN"}));
        let n = RequestNormalizer::new(&raw);

        assert!(matches!(n.float(&["area"]), Err(ValidationError::InvalidNumber { .. })));
        assert!(matches!(n.int(&["level"]), Err(ValidationError::NotAnInteger { .. })));
        assert!(matches!(n.int(&["rooms"]), Err(ValidationError::NotAnInteger { .. })));
        assert!(matches!(n.int(&["flag"]), Err(ValidationError::UnexpectedType { .. })));
        assert!(matches!(n.float(&["price"]), Err(ValidationError::InvalidNumber { .. })));
    }

    #[test]
    fn test_place_name_trailing_space() {
        assert_eq!(normalize_place_name("Нижний Новгород ").as_deref(), Some("Нижний Новгород"));
        assert_eq!(normalize_place_name("Нижний Новгород").as_deref(), Some("Нижний Новгород"));
        // Only a single trailing space is dropped
        assert_eq!(normalize_place_name("Saint Petersburg  ").as_deref(), Some("Saint Petersburg "));
        // Single-word names are left alone
        assert_eq!(normalize_place_name("Москва ").as_deref(), Some("Москва "));
        assert_eq!(normalize_place_name("  "), None);
    }

    #[test]
    fn test_place_name_must_be_text() {
        let raw = payload(json!({"city": 77}));
        let n = RequestNormalizer::new(&raw);

        assert!(n.place_name(&["city"]).is_err());
    }
}

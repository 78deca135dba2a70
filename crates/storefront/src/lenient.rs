//! Forgiving deserializers for remote and legacy JSON.
//!
//! The public catalog APIs occasionally omit fields or send them with the
//! wrong type. A malformed field decodes as its type's default rather than
//! failing the whole response.

use eleegon_core::Price;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode `T`, falling back to `T::default()` on any type mismatch.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Decode a list, dropping elements that fail to decode.
pub fn vec_skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect();
    if decoded.len() < total {
        tracing::debug!(
            dropped = total - decoded.len(),
            "Skipped malformed list elements"
        );
    }
    Ok(decoded)
}

/// Decode a non-negative count that may arrive as a number or a string.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.round().clamp(0.0, f64::from(u32::MAX)))
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        // Clamped to the u32 range above
                        let whole = f as u64;
                        whole
                    })
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Decode a decimal that may arrive as a number or a numeric string.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(_) | Value::String(_) => <Decimal as Deserialize>::deserialize(value).ok(),
        _ => None,
    })
}

/// Decode a price, treating malformed values as zero and clamping negatives.
pub fn price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(decimal(deserializer)?.map_or(Price::ZERO, Price::saturating))
}

/// Decode text that may arrive as a string or a bare number (e.g., house
/// numbers and zip codes).
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Decode an optional plain-text secret (e.g., a password echoed by the API).
pub fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(SecretString::from(s)),
        _ => None,
    })
}

/// Decode a truthy flag.
///
/// Booleans and numbers decode as usual. Strings are true unless blank,
/// `"0"` or `"false"`, so status words like `"SUCCESS"` count as true.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        _ => false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "super::or_default")]
        title: String,
        #[serde(default, deserialize_with = "super::vec_skip_invalid")]
        tags: Vec<u32>,
        #[serde(default, deserialize_with = "super::count")]
        quantity: Option<u32>,
        #[serde(default, deserialize_with = "super::decimal")]
        price: Option<rust_decimal::Decimal>,
        #[serde(default, deserialize_with = "super::secret")]
        password: Option<secrecy::SecretString>,
        #[serde(default, deserialize_with = "super::flag")]
        status: bool,
        #[serde(default, deserialize_with = "super::price")]
        cost: eleegon_core::Price,
        #[serde(default, deserialize_with = "super::text")]
        zipcode: String,
    }

    #[test]
    fn test_well_formed() {
        let s: Sample = serde_json::from_str(
            r#"{"title":"Shirt","tags":[1,2],"quantity":3,"price":9.5,"password":"pw","status":true}"#,
        )
        .unwrap();
        assert_eq!(s.title, "Shirt");
        assert_eq!(s.tags, vec![1, 2]);
        assert_eq!(s.quantity, Some(3));
        assert_eq!(s.price, Some(rust_decimal::Decimal::new(95, 1)));
        assert_eq!(s.password.unwrap().expose_secret(), "pw");
        assert!(s.status);
    }

    #[test]
    fn test_malformed_fields_default() {
        let s: Sample = serde_json::from_str(
            r#"{"title":42,"tags":[1,"x",3],"quantity":"2","price":"12.00","password":null,"status":1}"#,
        )
        .unwrap();
        assert_eq!(s.title, "");
        assert_eq!(s.tags, vec![1, 3]);
        assert_eq!(s.quantity, Some(2));
        assert_eq!(s.price, Some(rust_decimal::Decimal::new(1200, 2)));
        assert!(s.password.is_none());
        assert!(s.status);
    }

    #[test]
    fn test_absent_fields_default() {
        let s: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(s.title, "");
        assert!(s.tags.is_empty());
        assert!(s.quantity.is_none());
        assert!(s.price.is_none());
        assert!(!s.status);
    }

    #[test]
    fn test_negative_and_fractional_counts() {
        let s: Sample = serde_json::from_str(r#"{"quantity":-4}"#).unwrap();
        assert!(s.quantity.is_none());
        let s: Sample = serde_json::from_str(r#"{"quantity":2.0}"#).unwrap();
        assert_eq!(s.quantity, Some(2));
    }

    #[test]
    fn test_status_words() {
        for (raw, expected) in [
            (r#""SUCCESS""#, true),
            (r#""false""#, false),
            (r#""""#, false),
            ("0", false),
            ("null", false),
        ] {
            let s: Sample = serde_json::from_str(&format!(r#"{{"status":{raw}}}"#)).unwrap();
            assert_eq!(s.status, expected, "status {raw}");
        }
    }

    #[test]
    fn test_price_and_text() {
        let s: Sample = serde_json::from_str(r#"{"cost":"-4","zipcode":12926}"#).unwrap();
        assert_eq!(s.cost, eleegon_core::Price::ZERO);
        assert_eq!(s.zipcode, "12926");

        let s: Sample = serde_json::from_str(r#"{"cost":109.95,"zipcode":"12926-3874"}"#).unwrap();
        assert_eq!(s.cost.to_string(), "109.95");
        assert_eq!(s.zipcode, "12926-3874");
    }
}

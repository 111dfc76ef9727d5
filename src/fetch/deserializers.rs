use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string as emitted by the admin API.
/// Accepts ISO-8601 (with or without fractional seconds or a trailing Z),
/// SQL-style "YYYY-MM-DD HH:MM[:SS]", and bare dates (midnight assumed).
/// Returns None for empty or unparseable strings.
pub fn parse_api_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim().trim_end_matches('Z');
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Serde-compatible deserializers for use with `#[serde(deserialize_with = "de::...")]`.
pub mod de {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer};
    use serde_json::Value;

    /// "2024-01-05T10:30:00" → NaiveDateTime (required field).
    pub fn datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_api_datetime(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp: {:?}", s)))
    }

    /// "2024-01-05T10:30:00" → Some(NaiveDateTime); null, "", or an
    /// unparseable value → None. Never errors: a broken optional
    /// timestamp degrades to "absent" instead of rejecting the record.
    pub fn datetime_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(super::parse_api_datetime(&s)),
            _ => Ok(None),
        }
    }

    /// "3" or 3 → "3". Ids arrive as either JSON strings or numbers
    /// depending on the endpoint.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    /// Like `string_or_number` but lenient: null or any other shape → None.
    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            _ => Ok(None),
        }
    }
}

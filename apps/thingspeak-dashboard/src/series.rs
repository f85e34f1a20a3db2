//! Reshapes ThingSpeak feed entries into chartable series.
//!
//! `project_series` is the shape `/data` has always returned: three unzipped
//! sequences where each reading series drops its own unparseable values, so
//! indices across the three arrays only line up when every value parsed.
//! `project_aligned` filters whole records instead, and also drops records
//! without a timestamp.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::FieldMapping;
use crate::thingspeak::FeedEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesTriple {
    #[serde(rename = "temperatura")]
    pub temperature: Vec<f64>,
    #[serde(rename = "umidade")]
    pub humidity: Vec<f64>,
    #[serde(rename = "tempo")]
    pub time: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedReading {
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
}

pub fn project_series(entries: &[FeedEntry], fields: &FieldMapping) -> SeriesTriple {
    let temperature = entries
        .iter()
        .filter_map(|entry| entry.field(&fields.temperature).and_then(parse_reading))
        .collect();
    let humidity = entries
        .iter()
        .filter_map(|entry| entry.field(&fields.humidity).and_then(parse_reading))
        .collect();
    let time = entries.iter().map(|entry| entry.created_at.clone()).collect();

    SeriesTriple {
        temperature,
        humidity,
        time,
    }
}

pub fn project_aligned(entries: &[FeedEntry], fields: &FieldMapping) -> Vec<AlignedReading> {
    entries
        .iter()
        .filter_map(|entry| {
            let time = entry.created_at.clone()?;
            let temperature = entry.field(&fields.temperature).and_then(parse_reading)?;
            let humidity = entry.field(&fields.humidity).and_then(parse_reading)?;
            Some(AlignedReading {
                time,
                temperature,
                humidity,
            })
        })
        .collect()
}

/// ThingSpeak sends field values as strings (or `null` when the device skipped
/// the field); some self-hosted servers send plain numbers. Strings are read up
/// to the end of their leading number, so `"23.5C"` and `"60%"` keep their value.
pub fn parse_reading(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::String(raw) => {
            let number = leading_number(raw.trim());
            if number.is_empty() {
                return None;
            }
            number.parse::<f64>().ok()?
        }
        JsonValue::Number(num) => num.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Longest prefix of the form `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?`.
fn leading_number(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(start);
    let mut end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = digits_from(int_end + 1);
        if frac_end > int_end + 1 {
            end = frac_end;
        }
    }
    if end == start {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    &raw[..end]
}

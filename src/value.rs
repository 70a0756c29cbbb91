//! Numeric extraction from application-reported metric values.
//!
//! Applications report custom metrics as plain numbers, bare strings, or
//! descriptor objects whose `value` is a string that may carry a unit
//! suffix (`"12.3ms"`, `"45.6mb"`). The display name decides how the unit
//! is stripped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::error::MetricError;

/// Longest leading float literal, the way a lenient float parse reads it.
static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid float regex")
});

/// Leading run of ASCII digits and decimal points.
static DIGITS_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9.]+").expect("valid digits regex"));

/// A JSON scalar that may arrive either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Number(n) => Cow::Owned(n.to_string()),
            Scalar::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Numeric view; strings are parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => parse_float_prefix(s),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Descriptor object attached to a custom metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDescriptor {
    #[serde(default)]
    pub value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Raw value of one custom metric as reported by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMetricValue {
    Number(serde_json::Number),
    Text(String),
    Descriptor(MetricDescriptor),
    /// Any other JSON shape; never parses.
    Other(serde_json::Value),
}

impl RawMetricValue {
    /// The textual form the unit-stripping rules operate on.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawMetricValue::Number(n) => Some(Cow::Owned(n.to_string())),
            RawMetricValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            RawMetricValue::Descriptor(d) => d.value.as_ref().map(Scalar::as_text),
            RawMetricValue::Other(_) => None,
        }
    }
}

impl fmt::Display for RawMetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawMetricValue::Number(n) => write!(f, "{n}"),
            RawMetricValue::Text(s) => write!(f, "{s:?}"),
            RawMetricValue::Descriptor(MetricDescriptor { value: Some(v), .. }) => {
                write!(f, "{:?}", v.as_text())
            }
            RawMetricValue::Descriptor(MetricDescriptor { value: None, .. }) => {
                f.write_str("<missing>")
            }
            RawMetricValue::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Parses the leading float literal of `s`, ignoring any trailing text.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let m = FLOAT_PREFIX.find(s)?;
    m.as_str().trim_start().parse::<f64>().ok()
}

/// Extracts a finite number from a custom metric value.
///
/// - `"Loop delay"`: leading digits and dots, suffix ignored.
/// - names containing `"Event Loop Latency"` or `"Heap Size"`: the text
///   before the first `m` (`"12.3ms"`, `"45.6mb"`).
/// - anything else: the value itself.
pub fn parse_metric_value(display_name: &str, raw: &RawMetricValue) -> Result<f64, MetricError> {
    let unparsable = || MetricError::UnparsableMetricValue {
        name: display_name.to_string(),
        raw: raw.to_string(),
    };

    let text = raw.as_text().ok_or_else(unparsable)?;

    let value = if display_name == "Loop delay" {
        DIGITS_PREFIX
            .find(&text)
            .and_then(|m| parse_float_prefix(m.as_str()))
    } else if display_name.contains("Event Loop Latency") || display_name.contains("Heap Size") {
        let head = text.split('m').next().unwrap_or_default();
        parse_float_prefix(head)
    } else {
        parse_float_prefix(&text)
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(unparsable()),
    }
}

//! Claims - atomic assertions found in candidate text
//!
//! Claims live for a single verification pass and are never persisted.

use crate::fact::FactKind;
use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte range of the candidate text plus the text it covers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    /// Byte offset of the first character
    pub start: usize,

    /// Byte offset one past the last character
    pub end: usize,

    /// The covered substring
    pub text: String,
}

impl TextSpan {
    /// Create a span over `source[start..end]`
    ///
    /// Returns `None` when the range is out of bounds or not on character
    /// boundaries.
    pub fn from_source(source: &str, start: usize, end: usize) -> Option<Self> {
        let text = source.get(start..end)?;
        Some(Self {
            start,
            end,
            text: text.to_string(),
        })
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A tenure assertion such as "5 years" or "10+ years"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TenureClaim {
    /// Number of years asserted
    pub years: f64,

    /// "N+", "over N", "more than N": a lower bound, not an exact figure
    pub at_least: bool,
}

impl fmt::Display for TenureClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.at_least {
            write!(f, "{}+ years", self.years)
        } else {
            write!(f, "{} years", self.years)
        }
    }
}

/// What a claim asserts about its subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AssertedValue {
    /// A plain string (employer, URL, status)
    Text(String),

    /// An explicit date range or single date
    Period(Period),

    /// A duration
    Tenure(TenureClaim),
}

impl fmt::Display for AssertedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertedValue::Text(text) => f.write_str(text),
            AssertedValue::Period(period) => write!(f, "{}", period),
            AssertedValue::Tenure(tenure) => write!(f, "{}", tenure),
        }
    }
}

/// An atomic factual assertion found in generated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Category of the assertion
    pub kind: FactKind,

    /// What the claim is about (employer, role, project, skill)
    pub subject: String,

    /// What the text claims about the subject
    pub asserted_value: AssertedValue,

    /// Where in the candidate text the claim was found
    pub span: TextSpan,
}

impl Claim {
    /// Create a claim
    pub fn new(
        kind: FactKind,
        subject: impl Into<String>,
        asserted_value: AssertedValue,
        span: TextSpan,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            asserted_value,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_source() {
        let source = "worked at Acme";
        let span = TextSpan::from_source(source, 10, 14).unwrap();
        assert_eq!(span.text, "Acme");
        assert_eq!(span.len(), 4);
        assert!(TextSpan::from_source(source, 10, 40).is_none());
    }

    #[test]
    fn test_span_overlap() {
        let a = TextSpan { start: 0, end: 10, text: String::new() };
        let b = TextSpan { start: 9, end: 12, text: String::new() };
        let c = TextSpan { start: 10, end: 12, text: String::new() };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_asserted_value_display() {
        let tenure = AssertedValue::Tenure(TenureClaim { years: 5.0, at_least: true });
        assert_eq!(tenure.to_string(), "5+ years");
        assert_eq!(AssertedValue::Text("Acme".into()).to_string(), "Acme");
    }

    #[test]
    fn test_claim_serializes_tagged_value() {
        let claim = Claim::new(
            FactKind::Employer,
            "Acme",
            AssertedValue::Text("Acme".into()),
            TextSpan { start: 0, end: 4, text: "Acme".into() },
        );
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["kind"], "EMPLOYER");
        assert_eq!(json["asserted_value"]["type"], "text");
        assert_eq!(json["span"]["text"], "Acme");
    }
}

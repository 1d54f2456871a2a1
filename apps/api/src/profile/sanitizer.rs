//! Profile Sanitizer — coerces client-submitted student profiles into a
//! bounded numeric profile that is always safe to score.
//!
//! Sanitization never fails. Unparseable numbers degrade to fixed defaults so
//! a half-filled form still produces a recommendation prompt.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Loan amount assumed when the client sends none (or a non-positive one).
pub const DEFAULT_LOAN_AMOUNT: u64 = 500_000;
/// Annual family income assumed when the client sends none (or a non-positive one).
pub const DEFAULT_FAMILY_INCOME: u64 = 300_000;

/// Student profile exactly as the client sent it. Numeric fields may arrive
/// as numbers, numeric strings, empty strings, null, or not at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudentProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dob: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub college: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub course: String,
    #[serde(default)]
    pub cgpa: Option<Value>,
    #[serde(default)]
    pub loan_amount: Option<Value>,
    #[serde(default)]
    pub family_income: Option<Value>,
}

/// Numeric profile used for scoring.
///
/// Invariants: `loan_amount > 0`, `family_income > 0`, `cgpa >= 0.0`,
/// `lti >= 0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedStudentProfile {
    pub cgpa: f64,
    pub loan_amount: u64,
    pub family_income: u64,
    /// Loan-to-income ratio, rounded to 2 decimal places.
    pub lti: f64,
}

pub fn sanitize(raw: &RawStudentProfile) -> SanitizedStudentProfile {
    let cgpa = parse_real(raw.cgpa.as_ref())
        .filter(|v| *v >= 0.0)
        .unwrap_or(0.0);
    let loan_amount = positive_or(parse_integer(raw.loan_amount.as_ref()), DEFAULT_LOAN_AMOUNT);
    let family_income = positive_or(
        parse_integer(raw.family_income.as_ref()),
        DEFAULT_FAMILY_INCOME,
    );

    SanitizedStudentProfile {
        cgpa,
        loan_amount,
        family_income,
        lti: loan_to_income(loan_amount, family_income),
    }
}

/// `loan / max(income, 1)`, rounded half away from zero to 2 decimals.
pub fn loan_to_income(loan_amount: u64, family_income: u64) -> f64 {
    round2(loan_amount as f64 / family_income.max(1) as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse failures count as zero, and zero or below takes the default.
fn positive_or(parsed: Option<i64>, default: u64) -> u64 {
    match parsed.unwrap_or(0) {
        v if v > 0 => v as u64,
        _ => default,
    }
}

/// Reads a finite real number from a JSON number or numeric string.
pub fn parse_real(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Reads an integer from a JSON number or an integer string. Fractional
/// numbers truncate toward zero; fractional strings are rejected.
pub fn parse_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Accepts any scalar where text is expected; null and composites become "".
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

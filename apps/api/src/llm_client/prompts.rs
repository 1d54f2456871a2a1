// Shared prompt constants and prompt-building utilities.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Appended to every prompt whose reply goes through the normalizer.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Return pure JSON only. Do NOT use markdown code fences. \
Do NOT include explanations, comments, or apologies.";

/// Formats a whole currency amount with comma thousands separators
/// (`1500000` → `1,500,000`).
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fills `{placeholder}` slots in a template. Unknown placeholders are left
/// untouched.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

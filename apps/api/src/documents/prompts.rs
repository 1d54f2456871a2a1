// Document extraction prompts.
// The field list is the contract with the profile form on the client.

pub const EXTRACTED_FIELDS_SCHEMA: &str = r#"{
  "name": "student full name",
  "dob": "date of birth",
  "college": "college/university name",
  "course": "course/program name",
  "batch": "batch/year",
  "cgpa": "CGPA or percentage",
  "loanAmount": "loan amount needed in INR",
  "familyIncome": "family annual income in INR"
}"#;

/// Used when the document itself is attached to the request.
pub const ATTACHED_DOCUMENT_PROMPT: &str = r#"You are analyzing a student document (ID card, marksheet, or admission letter).

Extract and return ONLY this JSON (no extra text):
{schema}

Rules:
- Extract exactly what you see
- If a field is not visible, use empty string ""
- Return pure JSON only, no markdown, no explanations"#;

/// Used when only the text layer of a PDF could be recovered.
pub const EXTRACTED_TEXT_PROMPT: &str = r#"Here is text extracted from a student document:

{text}

Extract and return ONLY this JSON:
{schema}

Rules:
- If a field is not present in the text, use empty string ""
- Return pure JSON only, no markdown."#;

pub fn attached_document_prompt() -> String {
    ATTACHED_DOCUMENT_PROMPT.replace("{schema}", EXTRACTED_FIELDS_SCHEMA)
}

pub fn extracted_text_prompt(text: &str) -> String {
    // schema first so document text containing "{schema}" is left alone
    EXTRACTED_TEXT_PROMPT
        .replace("{schema}", EXTRACTED_FIELDS_SCHEMA)
        .replacen("{text}", text.trim(), 1)
}

// Loan recommendation prompt. Placeholders are filled by `build_prompt`.

use crate::llm_client::prompts::{fill, format_amount, JSON_ONLY_INSTRUCTION};
use crate::profile::sanitizer::{RawStudentProfile, SanitizedStudentProfile};

/// How many banks the model is asked to rank.
pub const TOP_N: usize = 3;

pub const RECOMMEND_PROMPT_TEMPLATE: &str = r#"You are an experienced Indian education loan analyst. Evaluate the student's profile carefully and recommend the TOP {top_n} banks most suitable for an education loan.

STUDENT PROFILE:
- Name: {name}
- DOB: {dob}
- College: {college}
- Course: {course}
- CGPA: {cgpa}
- Loan Amount Needed: ₹{loan_amount}
- Family Income: ₹{family_income}
- Loan-to-Income Ratio (LTI): {lti}

---------------------------------------------------
EVALUATION LOGIC:
Use these rules to decide eligibility and scoring.

1. Academic Score (0–100)
   - CGPA ≥ 9 → 100
   - 8–9 → 85
   - 7–8 → 70
   - 6–7 → 50
   - 5–6 → 30
   - <5 → 10

2. Loan-to-Income Ratio (LTI = LoanAmount / FamilyIncome)
   - LTI ≤ 1 → 90
   - ≤2 → 80
   - ≤3 → 70
   - ≤5 → 50
   - ≤10 → 30
   - ≤20 → 15
   - >20 → 5

3. Risk Adjustment
   - If CGPA < 6 → −10 points
   - If LTI > 10 → −20 points
   - If LTI > 20 → −30 points
   - If LoanAmount > 20L → −10 (collateral mandatory)
   - If FamilyIncome < 3L → +5 if government/public bank, −10 for private

4. Bank Suitability
   - Public banks (SBI, PNB, Canara, BoB, Union, Central Bank) = best for low income or low CGPA.
   - Private banks (HDFC, ICICI, Axis) = only if strong profile and high CGPA.
   - Penalize private banks for weak profiles.
   - Favor government banks if CGPA < 7 or income < ₹5L.

5. Final Score
   Weighted = 0.4*(Academic) + 0.4*(LTI) + 0.2*(Suitability adjustments)
   Clamp between 0–100.
   Be very critical — weak profiles should get <45.

---------------------------------------------------
OUTPUT RULES:
Return only a JSON array with exactly {top_n} items. Each object must follow:

[
  {
    "bank": "Bank Name",
    "match_reason": "Why this bank is suitable (50–100 words; mention CGPA, LTI, collateral, subsidy, risk)",
    "score": <integer 0–100>,
    "key_features": ["feature1", "feature2", "feature3"],
    "link": "https://..."
  }
]

{json_only}"#;

/// Builds the recommendation prompt. Text fields come from the raw profile,
/// numbers from the sanitized one.
pub fn build_prompt(raw: &RawStudentProfile, profile: &SanitizedStudentProfile) -> String {
    fill(
        RECOMMEND_PROMPT_TEMPLATE,
        &[
            ("top_n", TOP_N.to_string().as_str()),
            ("name", or_unknown(&raw.name)),
            ("dob", or_unknown(&raw.dob)),
            ("college", or_unknown(&raw.college)),
            ("course", or_unknown(&raw.course)),
            ("cgpa", profile.cgpa.to_string().as_str()),
            ("loan_amount", format_amount(profile.loan_amount).as_str()),
            ("family_income", format_amount(profile.family_income).as_str()),
            ("lti", profile.lti.to_string().as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

fn or_unknown(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        "Not provided"
    } else {
        value
    }
}

//! Static education-loan catalog served by `GET /loans`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LoanProduct {
    pub bank: &'static str,
    pub interest_rate: &'static str,
    pub loan_amount: &'static str,
    pub collateral: &'static str,
    pub documents: &'static [&'static str],
    pub credit_score: &'static str,
    pub repayment: &'static str,
    pub special: Option<&'static str>,
}

pub static LOAN_PRODUCTS: &[LoanProduct] = &[
    LoanProduct {
        bank: "State Bank of India",
        interest_rate: "8.30%–11.50%",
        loan_amount: "Up to ₹3 crore",
        collateral: "Not required up to ₹7.5 lakh; required above",
        documents: &[
            "Admission letter",
            "Previous marksheets",
            "Cost estimate",
            "KYC",
            "Co-applicant details",
        ],
        credit_score: "Co-applicant CIBIL 685+ preferred",
        repayment: "Moratorium, then up to 15 years",
        special: Some("Global Ed-Vantage scheme"),
    },
    LoanProduct {
        bank: "Punjab National Bank",
        interest_rate: "8.55%–11.25%",
        loan_amount: "Up to ₹1 crore",
        collateral: "None up to ₹7.5 lakh; otherwise, tangible security",
        documents: &["Admission proof", "Mark sheets", "Co-applicant"],
        credit_score: "Co-borrower's credit profile considered",
        repayment: "Moratorium, then 15 years",
        special: None,
    },
    LoanProduct {
        bank: "Bank of Baroda",
        interest_rate: "9.10%–12.45%",
        loan_amount: "Up to ₹80 lakh (abroad)",
        collateral: "None up to ₹7.5 lakh, security above",
        documents: &["Admission letter", "Past marksheets"],
        credit_score: "Co-applicant or collateral",
        repayment: "Moratorium, then 15 years",
        special: None,
    },
    LoanProduct {
        bank: "ICICI Bank",
        interest_rate: "9.50% onwards",
        loan_amount: "Up to ₹2 crore",
        collateral: "May be required for large amounts",
        documents: &["Admission letter", "KYC", "Co-applicant"],
        credit_score: "Co-applicant or collateral",
        repayment: "Moratorium, then 10-15 years",
        special: None,
    },
    LoanProduct {
        bank: "Bank of India",
        interest_rate: "8.25%–11.60%",
        loan_amount: "Up to ₹1 crore",
        collateral: "None up to ₹7.5 lakh; tangible security above",
        documents: &["Merit/admission letter", "Past marksheets"],
        credit_score: "Co-applicant/collateral",
        repayment: "Moratorium, then 15 years",
        special: None,
    },
    LoanProduct {
        bank: "Canara Bank",
        interest_rate: "7.30%–10.85%",
        loan_amount: "Up to ₹1 crore",
        collateral: "Not required up to ₹7.5 lakh; otherwise tangible security",
        documents: &["Admission", "Academic proofs", "Co-applicant"],
        credit_score: "Co-applicant's CIBIL used",
        repayment: "Moratorium, then 15 years",
        special: None,
    },
    LoanProduct {
        bank: "Bank of Maharashtra",
        interest_rate: "7.60%–11.05%",
        loan_amount: "Up to ₹20-40 lakh",
        collateral: "Not required up to ₹7.5 lakh; above: collateral",
        documents: &["Fee schedule", "Marksheets", "Co-applicant", "Account proof"],
        credit_score: "Co-applicant preferred",
        repayment: "Moratorium, then 15 years",
        special: None,
    },
    LoanProduct {
        bank: "Axis Bank",
        interest_rate: "13.70%–15.20%",
        loan_amount: "Up to ₹40 lakh",
        collateral: "May not be required for select institutes",
        documents: &["Academic proofs", "Co-applicant"],
        credit_score: "Applicant & co-applicant scored",
        repayment: "Moratorium, then up to 10-15 years",
        special: None,
    },
    LoanProduct {
        bank: "HDFC Bank",
        interest_rate: "9.50% onwards",
        loan_amount: "Up to ₹50-150 lakh",
        collateral: "May not be needed for select institutes",
        documents: &["Admission", "Academic", "Cost", "Co-applicant"],
        credit_score: "Co-applicant preferred",
        repayment: "Moratorium, then max 15 years",
        special: None,
    },
    LoanProduct {
        bank: "Central Bank of India",
        interest_rate: "8.30%–11.25%",
        loan_amount: "Up to ₹50 lakh",
        collateral: "Required above ₹7.5 lakh",
        documents: &["Admission", "Proof of expenses", "Past records"],
        credit_score: "Co-applicant preferred",
        repayment: "Moratorium, then max 15 years",
        special: None,
    },
];

// Document extraction: read an uploaded ID card, marksheet or admission
// letter and return the student fields found on it.

pub mod handlers;
pub mod prompts;
pub mod upload;

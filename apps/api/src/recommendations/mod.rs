// Loan recommendations: sanitize the profile, ask the model to rank banks,
// return the top picks. All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;

// Student profile handling shared by the recommendation and scholarship flows.

pub mod sanitizer;

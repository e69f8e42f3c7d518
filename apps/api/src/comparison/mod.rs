// Career comparison: cached LLM analysis with a deterministic fallback.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod comparer;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;

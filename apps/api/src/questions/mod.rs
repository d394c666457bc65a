// Survey question generation: prompt → LLM → tolerant parse → normalized list,
// with a fixed fallback set whenever the model cannot be used.
// All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod parser;
pub mod prompts;

// Shared prompt fragments. Each feature keeps its own prompts.rs alongside it;
// only cross-cutting instructions live here.

/// Appended to any system prompt whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Ensure your JSON is properly formatted and valid. \
    Do not include any explanations or text outside the JSON structure.";

/// Appended to any system prompt whose output is shown verbatim to a user.
pub const NO_COMMENTARY_INSTRUCTION: &str =
    "Return only the requested content without any additional commentary.";

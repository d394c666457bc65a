// Prompt constants for survey question generation.
// The system prompt is assembled once; the user prompt is a template.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

const QUESTION_SYSTEM_BODY: &str = r#"You are an AI specialized in HR and recruitment. Your task is to analyze job descriptions and create insightful questions that recruiters can ask to gain more context about the role.

Your questions should focus on:
1. Uncovering specific technical or soft skills that might not be explicitly stated
2. Understanding team dynamics and company culture
3. Clarifying expectations and success metrics
4. Identifying potential challenges in the role
5. Determining what type of candidate would thrive in this position

Format your response as a valid JSON object containing an array of questions with the following structure:
{
  "questions": [
    {
      "id": 1,
      "question": "Clear, concise question text",
      "category": "One of: skills, culture, expectations, challenges, candidate_fit"
    }
  ]
}"#;

/// Full system prompt for question generation.
pub fn question_system_prompt() -> String {
    format!("{QUESTION_SYSTEM_BODY}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// User prompt template. Replace `{job_description}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str =
    "Here is a job posting. Please create 5-7 thoughtful questions based on this content:\n\n{job_description}";

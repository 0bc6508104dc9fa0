//! Prompt templates for the coaching model.

use crate::models::Style;
use crate::services::providers::Prompt;

const COACH_PREAMBLE: &str = "You are an expert interview coach helping a candidate during a live job \
interview. Answer the interviewer's question in the candidate's own voice, drawing on their \
background when it is provided. Never mention that you are an AI and never add commentary \
about the answer itself.";

/// System prompt of the live transcript feedback endpoint.
pub const LIVE_FEEDBACK_SYSTEM_PROMPT: &str = "You are a real-time interview coach. Analyze the \
user's latest spoken sentence for clarity and content. Keep your response very short, no more \
than 10 words.";

fn style_instruction(style: Style) -> &'static str {
    match style {
        Style::Script => {
            "Respond with a natural, conversational answer of three to five sentences, written \
in the first person so it can be read aloud as-is."
        }
        Style::Bullet => {
            "Respond with three to four concise bullet points, each starting with \"- \", that \
the candidate can glance at while speaking."
        }
        Style::Shorthand => {
            "Respond in ultra-brief shorthand: a few keyword cues separated by \" / \", under \
25 words in total."
        }
    }
}

/// Inputs to [`build_prompt`]; blank optional sections are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInput<'a> {
    pub question: &'a str,
    pub context: Option<&'a str>,
    pub work_history: Option<&'a str>,
    pub style: Style,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the system/user message pair for an interview question.
pub fn build_prompt(input: PromptInput<'_>) -> Prompt {
    let system = format!("{} {}", COACH_PREAMBLE, style_instruction(input.style));

    let mut user = String::new();
    if let Some(context) = non_blank(input.context) {
        user.push_str("Candidate context:\n");
        user.push_str(context);
        user.push_str("\n\n");
    }
    if let Some(history) = non_blank(input.work_history) {
        user.push_str("Candidate work history:\n");
        user.push_str(history);
        user.push_str("\n\n");
    }
    user.push_str("Interviewer question:\n");
    user.push_str(input.question.trim());

    Prompt { system, user }
}

/// Prompt for a single chunk of live transcript.
pub fn live_feedback_prompt(transcript_chunk: &str) -> Prompt {
    Prompt {
        system: LIVE_FEEDBACK_SYSTEM_PROMPT.to_string(),
        user: transcript_chunk.to_string(),
    }
}

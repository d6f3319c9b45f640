//! Prompt templates sent to the model
//!
//! The exact text here, including the leading newlines and tab indentation,
//! is what the model is conditioned on. Changing any of it changes model
//! behavior.

/// Default system prompt: produce one step, or the completion sentinel
pub const LAZY_SYSTEM_PROMPT: &str = concat!(
    "\n",
    "You are a helpful assistant that can help with math problems.\n",
    "You will be given a problem and a list of steps as context, the format will be:\n",
    "\t\t\n",
    "PROBLEM: <problem>\n",
    "STEPS: <steps>\n",
    "\n",
    "Your job is to complete the next step and only the next step in the problem-solving process. ",
    "You should never give more than one step.\n",
    "If you evaluate that the problem is done, respond with \"PROBLEM DONE\"\n",
);

/// Text the model emits when it judges the problem solved
pub const DONE_SENTINEL: &str = "PROBLEM DONE";

/// System text for a side question
pub fn question_system(system_prompt: &str, problem: &str, context: &str, current_step: &str) -> String {
    format!(
        "\n\t\tSystem: {system_prompt}\n\t\tProblem: {problem}\n\t\tContext: {context}\n\t\tCurrent step: {current_step}\n\t"
    )
}

/// User prompt for a side question. `history` is the serialized Q&A log.
pub fn question_prompt(history: &str, question: &str) -> String {
    format!(
        "\n\t\tQuestion History: {history}\n\t\tQuestion: {question}\n\n\
         \t\tPlease answer the question without advancing to the next step.\n\
         \t\tIf you are asked to provide an example for a specific step, please provide an example that is not in the current context.\n\t"
    )
}

/// Whether trimmed model output is the completion sentinel.
///
/// Case-insensitive; a trailing period is tolerated.
pub fn is_done_sentinel(text: &str) -> bool {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text).trim_end();
    text.eq_ignore_ascii_case(DONE_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_exact_text() {
        let expected = "
You are a helpful assistant that can help with math problems.
You will be given a problem and a list of steps as context, the format will be:
\t\t
PROBLEM: <problem>
STEPS: <steps>

Your job is to complete the next step and only the next step in the problem-solving process. You should never give more than one step.
If you evaluate that the problem is done, respond with \"PROBLEM DONE\"
";
        assert_eq!(LAZY_SYSTEM_PROMPT, expected);
    }

    #[test]
    fn test_question_system_layout() {
        let text = question_system("SYS", "p", "ctx", "cur");
        assert_eq!(
            text,
            "\n\t\tSystem: SYS\n\t\tProblem: p\n\t\tContext: ctx\n\t\tCurrent step: cur\n\t"
        );
    }

    #[test]
    fn test_question_prompt_layout() {
        let text = question_prompt(r#"["q","a"]"#, "why?");
        let expected = "\n\t\tQuestion History: [\"q\",\"a\"]\n\t\tQuestion: why?\n\n\
            \t\tPlease answer the question without advancing to the next step.\n\
            \t\tIf you are asked to provide an example for a specific step, please provide an example that is not in the current context.\n\t";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_done_sentinel_detection() {
        assert!(is_done_sentinel("PROBLEM DONE"));
        assert!(is_done_sentinel("  problem done.  "));
        assert!(is_done_sentinel("Problem Done"));
        assert!(!is_done_sentinel("PROBLEM DONE: x = 2"));
        assert!(!is_done_sentinel("The problem is not done"));
        assert!(!is_done_sentinel(""));
    }

    #[test]
    fn test_system_prompt_mentions_sentinel() {
        assert!(LAZY_SYSTEM_PROMPT.contains(DONE_SENTINEL));
        assert!(LAZY_SYSTEM_PROMPT.contains("only the next step"));
    }
}

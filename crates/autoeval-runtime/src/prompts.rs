//! Prompt catalog for the evaluation pipeline.
//!
//! Every instruction the pipeline sends to a backend lives here, as a
//! constant, so the pipeline modules carry no prompt text of their own.

/// Decomposition instruction: break a text into atomic sentences.
pub const DECOMPOSE_SYSTEM_PROMPT: &str = "\
You split text into atomic sentences. Each output sentence must contain \
exactly one independent clause stating exactly one fact. Split compound \
sentences at conjunctions and comma-joined clauses into separate \
sentences. Preserve the original nouns in every sentence; never replace \
a noun with a pronoun. Do not add, drop, or reinterpret information. \
Return every sentence, in the original order.";

/// Worked examples appended to the decomposition instruction on demand.
pub const DECOMPOSE_FEW_SHOT: &str = "\
Example input: \"The sky is blue and birds can fly.\"
Example output sentences: [\"The sky is blue.\", \"Birds can fly.\"]

Example input: \"Marie Curie, born in Warsaw, won two Nobel Prizes.\"
Example output sentences: [\"Marie Curie was born in Warsaw.\", \"Marie Curie won two Nobel Prizes.\"]";

/// Direct labeling instruction: one supported/unsupported verdict per
/// sentence, judged only against the reference text.
pub const DIRECT_LABEL_SYSTEM_PROMPT: &str = "\
You judge whether sentences are supported by a reference text. For each \
numbered sentence, decide whether the reference text alone supports it; \
use no outside knowledge. Return one verdict per sentence, in the same \
order as the input sentences, with the sentence text repeated verbatim.";

/// Question generation instruction: one yes/no question per sentence.
pub const QUESTION_GEN_SYSTEM_PROMPT: &str = "\
You turn sentences into verification questions. For each numbered \
sentence, write exactly one yes/no question whose affirmative answer \
asserts the sentence. Return one question per sentence, in the same \
order as the input sentences, with the sentence text repeated verbatim.";

/// Answerability instruction: can the reference text answer each
/// question affirmatively.
pub const QUESTION_CHECK_SYSTEM_PROMPT: &str = "\
You check questions against a reference text. For each numbered \
question, decide whether the reference text alone answers it \
affirmatively; use no outside knowledge. Return one verdict per \
question, in the same order as the input questions, with the question \
text repeated verbatim.";

/// Decomposition system prompt, with or without the worked examples.
pub fn decompose_system_prompt(include_few_shot: bool) -> String {
    if include_few_shot {
        format!("{DECOMPOSE_SYSTEM_PROMPT}\n\n{DECOMPOSE_FEW_SHOT}")
    } else {
        DECOMPOSE_SYSTEM_PROMPT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_prompt_demands_atomic_clauses() {
        assert!(DECOMPOSE_SYSTEM_PROMPT.contains("one independent clause"));
        assert!(DECOMPOSE_SYSTEM_PROMPT.contains("never replace a noun with a pronoun"));
    }

    #[test]
    fn test_few_shot_is_opt_in() {
        let bare = decompose_system_prompt(false);
        let with_examples = decompose_system_prompt(true);

        assert!(!bare.contains("Example input"));
        assert!(with_examples.starts_with(DECOMPOSE_SYSTEM_PROMPT));
        assert!(with_examples.contains("Marie Curie"));
    }

    #[test]
    fn test_labeling_prompts_pin_order() {
        assert!(DIRECT_LABEL_SYSTEM_PROMPT.contains("same order"));
        assert!(QUESTION_GEN_SYSTEM_PROMPT.contains("same order"));
        assert!(QUESTION_CHECK_SYSTEM_PROMPT.contains("same order"));
    }
}

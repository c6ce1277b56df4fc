//! Prompt composition: the fixed three-message sequence sent to the
//! completion backend.

use crate::backends::ChatMessage;

use super::types::{ContextBlock, Intent, Query};

const BASE_PERSONA: &str =
    "You are a technical assistant for the team's internal documentation.";

/// Hard behavioral requirement, appended to every system instruction:
/// the model must not answer from anything but the supplied content.
const GROUNDING_CONSTRAINT: &str = "Answer only from the provided content. If the provided \
content is insufficient to answer the question, say so explicitly.";

const NO_DOCUMENTS_NOTICE: &str =
    "No relevant documents were found in the index for this question.";

const CONTEXT_HEADER: &str = "Relevant documentation excerpts:";

/// The only place intent branches. Extend by adding rows, never by
/// branching elsewhere in the pipeline.
fn directive_for(intent: Intent) -> &'static str {
    match intent {
        Intent::Summary => "Summarize the provided information clearly and usefully.",
        Intent::Extraction => "Extract key data points and lists from the information.",
        Intent::DirectAnswer => "Answer precisely using only the provided information.",
        Intent::Procedure => "Explain the procedure step by step, numbered, in order.",
    }
}

/// Build the system/assistant/user message sequence, in that fixed
/// order. An empty context gets a distinct no-documents notice instead
/// of an empty string.
pub fn compose(query: &Query, context: &ContextBlock, intent: Intent) -> Vec<ChatMessage> {
    let system = format!(
        "{} {} {}",
        BASE_PERSONA,
        directive_for(intent),
        GROUNDING_CONSTRAINT
    );

    let assistant = if context.included_docs == 0 {
        NO_DOCUMENTS_NOTICE.to_string()
    } else {
        format!("{}\n{}", CONTEXT_HEADER, context.text)
    };

    vec![
        ChatMessage::system(system),
        ChatMessage::assistant(assistant),
        ChatMessage::user(query.text.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(text: &str, included_docs: usize) -> ContextBlock {
        ContextBlock {
            text: text.to_string(),
            included_docs,
            truncated: false,
        }
    }

    #[test]
    fn composes_three_messages_in_fixed_order() {
        let query = Query::new("How do I configure SSO?");
        let messages = compose(&query, &context("- **SSO**: steps", 1), Intent::Procedure);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "How do I configure SSO?");
        assert!(messages[1].content.contains("- **SSO**: steps"));
    }

    #[test]
    fn every_intent_gets_its_directive_and_the_grounding_constraint() {
        let query = Query::new("q");
        let block = context("x", 1);

        for (intent, phrase) in [
            (Intent::Summary, "Summarize the provided information"),
            (Intent::Extraction, "Extract key data points"),
            (Intent::DirectAnswer, "Answer precisely"),
            (Intent::Procedure, "step by step, numbered"),
        ] {
            let messages = compose(&query, &block, intent);
            assert!(messages[0].content.contains(phrase), "{intent:?}");
            assert!(
                messages[0].content.contains("insufficient"),
                "grounding constraint missing for {intent:?}"
            );
        }
    }

    #[test]
    fn empty_context_uses_the_no_documents_notice() {
        let query = Query::new("q");
        let messages = compose(&query, &ContextBlock::empty(), Intent::DirectAnswer);
        assert_eq!(messages[1].content, NO_DOCUMENTS_NOTICE);
    }
}

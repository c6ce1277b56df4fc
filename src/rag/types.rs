//! Request-scoped pipeline entities. Everything here is created, used
//! and discarded within a single `answer()` invocation.

use serde::Serialize;

use crate::backends::SearchHit;

/// A user question. The text is trimmed on construction; whether an
/// empty result is acceptable is decided by the pipeline entry point.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub explicit_intent: Option<Intent>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            explicit_intent: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.explicit_intent = Some(intent);
        self
    }
}

/// The answer style requested from the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Summary,
    Extraction,
    #[default]
    DirectAnswer,
    Procedure,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Summary => "summary",
            Intent::Extraction => "extraction",
            Intent::DirectAnswer => "direct_answer",
            Intent::Procedure => "procedure",
        }
    }

    /// Map a free-text label onto the closed set; anything unrecognized
    /// becomes the default answer style.
    pub fn parse_label(label: &str) -> Intent {
        match label.trim().to_lowercase().as_str() {
            "summary" => Intent::Summary,
            "extraction" => Intent::Extraction,
            "direct_answer" | "direct answer" => Intent::DirectAnswer,
            "procedure" => Intent::Procedure,
            _ => Intent::DirectAnswer,
        }
    }
}

/// One candidate document returned by retrieval, in backend rank order.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub url: String,
    pub score: f64,
    pub kind: Option<String>,
}

impl From<SearchHit> for Document {
    fn from(hit: SearchHit) -> Self {
        Self {
            title: hit.title,
            content: hit.content,
            url: hit.url,
            score: hit.score,
            kind: hit.kind,
        }
    }
}

/// The assembled context for one prompt.
#[derive(Debug, Clone)]
pub struct ContextBlock {
    pub text: String,
    pub included_docs: usize,
    /// Set when documents were cut or dropped to stay inside the budget.
    pub truncated: bool,
}

impl ContextBlock {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            included_docs: 0,
            truncated: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub score: f64,
}

/// The pipeline's sole output.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_text_is_trimmed() {
        let query = Query::new("  how do I configure SSO?  ");
        assert_eq!(query.text, "how do I configure SSO?");
        assert!(query.explicit_intent.is_none());
    }

    #[test]
    fn unknown_labels_fall_back_to_direct_answer() {
        assert_eq!(Intent::parse_label("procedure"), Intent::Procedure);
        assert_eq!(Intent::parse_label(" Summary \n"), Intent::Summary);
        assert_eq!(Intent::parse_label("direct answer"), Intent::DirectAnswer);
        assert_eq!(Intent::parse_label("poetry"), Intent::DirectAnswer);
        assert_eq!(Intent::parse_label(""), Intent::DirectAnswer);
    }
}

//! Source citations: stable deduplication by URL in retrieval order,
//! rendered as a trailing block after the answer body.

use std::collections::HashSet;

use crate::rag::types::{AnswerResult, Citation, Document};

pub struct CitationFormatter {
    /// `None` keeps every distinct source; the lean profile caps at 3.
    /// Always configured explicitly, never baked in here.
    max_citations: Option<usize>,
}

impl CitationFormatter {
    pub fn new(max_citations: Option<usize>) -> Self {
        Self { max_citations }
    }

    /// First occurrence of each distinct URL wins; later duplicates are
    /// dropped without re-ranking. Documents without a URL cannot be
    /// cited.
    pub fn collect(&self, documents: &[Document]) -> Vec<Citation> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut citations = Vec::new();

        for doc in documents {
            // Cap guard runs before the push so a cap of zero really
            // means no citations.
            if self.max_citations.is_some_and(|cap| citations.len() >= cap) {
                break;
            }
            let url = doc.url.trim();
            if url.is_empty() || !seen.insert(url) {
                continue;
            }
            citations.push(Citation {
                title: doc.title.clone(),
                url: url.to_string(),
                score: doc.score,
            });
        }

        citations
    }

    pub fn attach(&self, answer: String, documents: &[Document]) -> AnswerResult {
        let citations = self.collect(documents);
        if citations.is_empty() {
            return AnswerResult {
                text: answer,
                citations,
            };
        }

        let block: Vec<String> = citations
            .iter()
            .map(|c| format!("- [{}]({}) (score: {:.2})", c.title, c.url, c.score))
            .collect();

        AnswerResult {
            text: format!("{}\n\nSources:\n{}", answer, block.join("\n")),
            citations,
        }
    }
}

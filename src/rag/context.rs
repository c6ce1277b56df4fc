//! Context assembly: pack retrieved documents into one bounded string.
//!
//! A single greedy forward pass in retrieval order — the first entry
//! that would exceed the budget stops accumulation, and later documents
//! are never reconsidered. This is deliberately not a global
//! optimization over the candidate set.

use crate::config::ContextConfig;

use super::truncate_chars;
use super::types::{ContextBlock, Document};

pub struct ContextAssembler {
    char_budget: usize,
    per_doc_chars: usize,
}

impl ContextAssembler {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            char_budget: config.char_budget,
            per_doc_chars: config.per_doc_chars,
        }
    }

    pub fn build(&self, documents: &[Document]) -> ContextBlock {
        if documents.is_empty() {
            return ContextBlock::empty();
        }

        let mut entries: Vec<String> = Vec::new();
        let mut used = 0usize;
        let mut truncated = false;

        for doc in documents {
            let content = doc.content.trim();
            let capped = truncate_chars(content, self.per_doc_chars);
            if capped.len() < content.len() {
                truncated = true;
            }

            let entry = format!("- **{}**: {}", doc.title, capped);
            let entry_chars = entry.chars().count();
            // Single newline separator between entries, counted against
            // the budget.
            let separator = usize::from(!entries.is_empty());

            if used + separator + entry_chars > self.char_budget {
                truncated = true;
                break;
            }

            used += separator + entry_chars;
            entries.push(entry);
        }

        ContextBlock {
            included_docs: entries.len(),
            text: entries.join("\n"),
            truncated,
        }
    }
}

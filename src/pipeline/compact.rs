//! Idea compaction for the draft prompt
//!
//! The draft stage only needs a short description and a keyword list. A
//! deployment can plug in its own summariser through [`DescriptionCompactor`];
//! [`DefaultCompactor`] is a deterministic fallback.

use crate::model::IdeaContext;
use serde::Serialize;
use std::collections::HashSet;

const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 600;
const DEFAULT_MAX_KEYWORDS: usize = 12;
const MIN_KEYWORD_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "with", "that", "this", "from", "your", "their", "they", "them", "have", "will", "into",
    "about", "which", "what", "when", "where", "while", "there", "these", "those", "would",
    "could", "should", "other", "than", "then", "also", "just", "more", "most", "some", "such",
    "para", "como", "pero", "sobre", "entre", "desde", "donde", "cuando", "porque",
    "esta", "este", "estos", "estas", "tiene", "pueden", "puede", "hacer",
];

/// Reduced view of an idea used by the draft stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactedIdea {
    pub description: String,
    pub keywords: Vec<String>,
}

pub trait DescriptionCompactor: Send + Sync {
    fn compact(&self, idea: &IdeaContext) -> CompactedIdea;
}

#[derive(Debug, Clone)]
pub struct DefaultCompactor {
    max_description_chars: usize,
    max_keywords: usize,
}

impl Default for DefaultCompactor {
    fn default() -> Self {
        Self {
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }
}

impl DefaultCompactor {
    pub fn new(max_description_chars: usize, max_keywords: usize) -> Self {
        Self {
            max_description_chars,
            max_keywords,
        }
    }

    fn shorten(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= self.max_description_chars {
            return collapsed;
        }

        let mut shortened = String::new();
        for word in collapsed.split(' ') {
            let next_len = shortened.chars().count() + word.chars().count() + 1;
            if next_len > self.max_description_chars {
                break;
            }
            if !shortened.is_empty() {
                shortened.push(' ');
            }
            shortened.push_str(word);
        }
        shortened.push_str("...");
        shortened
    }

    fn keywords(&self, idea: &IdeaContext) -> Vec<String> {
        let mut seen = HashSet::new();
        let tags = idea
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty());

        let words = idea
            .title
            .split(|c: char| !c.is_alphanumeric())
            .chain(idea.description.split(|c: char| !c.is_alphanumeric()))
            .map(str::to_lowercase)
            .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
            .filter(|word| !STOP_WORDS.contains(&word.as_str()));

        tags.chain(words)
            .filter(|keyword| seen.insert(keyword.clone()))
            .take(self.max_keywords)
            .collect()
    }
}

impl DescriptionCompactor for DefaultCompactor {
    fn compact(&self, idea: &IdeaContext) -> CompactedIdea {
        let source = if idea.description.trim().is_empty() {
            &idea.title
        } else {
            &idea.description
        };

        CompactedIdea {
            description: self.shorten(source),
            keywords: self.keywords(idea),
        }
    }
}

//! Pipeline input types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The idea being validated. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaContext {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IdeaContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Output language for the human-readable parts of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Name used inside prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(format!(
                "Unsupported language '{}'. Valid options: en, es",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_builder() {
        let idea = IdeaContext::new("Pet-sitting marketplace")
            .with_description("Trusted neighbours look after your pets")
            .with_tags(["pets", "marketplace"]);

        assert_eq!(idea.title, "Pet-sitting marketplace");
        assert_eq!(idea.tags, vec!["pets", "marketplace"]);
    }

    #[test]
    fn test_idea_deserialize_defaults() {
        let idea: IdeaContext = serde_json::from_str(r#"{"title":"Only a title"}"#).unwrap();
        assert!(idea.description.is_empty());
        assert!(idea.tags.is_empty());
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" es ".parse::<Language>().unwrap(), Language::Es);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde() {
        assert_eq!(serde_json::to_string(&Language::Es).unwrap(), "\"es\"");
    }
}

//! Named prompt templates for manual model testing

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prompt wrappers offered by the model test endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTemplate {
    #[default]
    Basic,
    Creative,
    Analytical,
    Technical,
    Training,
}

impl PromptTemplate {
    pub fn all() -> [PromptTemplate; 5] {
        [
            PromptTemplate::Basic,
            PromptTemplate::Creative,
            PromptTemplate::Analytical,
            PromptTemplate::Technical,
            PromptTemplate::Training,
        ]
    }

    /// Wrap a user message in this template
    pub fn render(&self, message: &str) -> String {
        match self {
            PromptTemplate::Basic => format!(
                "You are a helpful AI assistant. Please respond to this message: \"{}\"",
                message
            ),
            PromptTemplate::Creative => format!(
                "You are a creative writer. Respond imaginatively and vividly to: \"{}\"",
                message
            ),
            PromptTemplate::Analytical => format!(
                "You are a careful analyst. Break down the following step by step and state your conclusion: \"{}\"",
                message
            ),
            PromptTemplate::Technical => format!(
                "You are a senior engineer. Give a precise technical answer, with examples where useful, to: \"{}\"",
                message
            ),
            PromptTemplate::Training => format!(
                "You are a career advisor who knows vocational and professional training programs. Answer: \"{}\"",
                message
            ),
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromptTemplate::Basic => "basic",
            PromptTemplate::Creative => "creative",
            PromptTemplate::Analytical => "analytical",
            PromptTemplate::Technical => "technical",
            PromptTemplate::Training => "training",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PromptTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PromptTemplate::all()
            .into_iter()
            .find(|t| t.to_string() == s.to_lowercase())
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown template '{}', expected basic|creative|analytical|technical|training",
                    s
                ))
            })
    }
}

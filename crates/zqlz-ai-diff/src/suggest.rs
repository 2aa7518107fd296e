//! Seam to the AI backend that proposes replacement SQL.
//!
//! Providers (OpenAI, Anthropic, local models, ...) live elsewhere; this crate
//! only needs "given the current text and an instruction, return a candidate
//! text". How the prompt is built is up to the provider.

use async_trait::async_trait;

/// What the user asked for and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// The current base text.
    pub base: String,
    /// The instruction typed into the prompt box.
    pub instruction: String,
    /// Line the prompt box was anchored to, if any.
    pub anchor_line: Option<usize>,
}

impl EditRequest {
    pub fn new(base: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            instruction: instruction.into(),
            anchor_line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.anchor_line = Some(line);
        self
    }
}

/// Produces a full replacement candidate for the base text.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn propose(&self, request: &EditRequest) -> anyhow::Result<String>;
}

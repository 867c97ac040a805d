use serde::Deserialize;

use tenantry_core::{DomainError, DomainResult};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct WriteNoteRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl WriteNoteRequest {
    /// Trimmed title; empty titles are rejected.
    pub fn validated_title(&self) -> DomainResult<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        Ok(title.to_string())
    }
}

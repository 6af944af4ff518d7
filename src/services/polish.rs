//! Text polishing collaborator
//!
//! A remote service rewrites the whole document. Only one request may be in
//! flight per document; a second trigger while one is pending is ignored.
//! A failed or empty response leaves the document unchanged.

use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};

use crate::error::{Error, Result};

/// Request sent to the text-transformation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishRequest {
    pub content: String,
    pub instruction: Option<String>,
}

/// A remote text-transformation service.
pub trait TextTransformer {
    /// Return the transformed text, or an error on missing credentials,
    /// network or service failure.
    fn transform(&mut self, request: &PolishRequest) -> Result<String>;
}

/// An accepted polish request, waiting for the service's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishTicket {
    pub doc_id: String,
    pub request: PolishRequest,
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Flight Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks which documents have a polish request in flight.
#[derive(Debug, Clone, Default)]
pub struct PolishGuard {
    in_flight: HashSet<String>,
}

impl PolishGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `doc_id`.
    ///
    /// Returns `None` (and does nothing) if the content is blank or a
    /// request for this document is already in flight.
    pub fn begin(
        &mut self,
        doc_id: &str,
        content: &str,
        instruction: Option<&str>,
    ) -> Option<PolishTicket> {
        if content.trim().is_empty() {
            debug!("Nothing to polish in {}", doc_id);
            return None;
        }
        if !self.in_flight.insert(doc_id.to_string()) {
            debug!("Polish already in flight for {}", doc_id);
            return None;
        }
        Some(PolishTicket {
            doc_id: doc_id.to_string(),
            request: PolishRequest {
                content: content.to_string(),
                instruction: instruction.map(str::to_string),
            },
        })
    }

    /// Finish a request and interpret the service's answer.
    ///
    /// Returns `Ok(Some(text))` when the document should be replaced,
    /// `Ok(None)` when the answer was empty or identical, and the service's
    /// error otherwise.
    pub fn complete(&mut self, ticket: &PolishTicket, response: Result<String>) -> Result<Option<String>> {
        self.in_flight.remove(&ticket.doc_id);
        match response {
            Ok(text) if text.trim().is_empty() => {
                warn!("Polish service returned nothing for {}", ticket.doc_id);
                Ok(None)
            }
            Ok(text) if text == ticket.request.content => Ok(None),
            Ok(text) => {
                info!("Polished {} ({} bytes)", ticket.doc_id, text.len());
                Ok(Some(text))
            }
            Err(e) => {
                warn!("Polish failed for {}: {}", ticket.doc_id, e);
                Err(e)
            }
        }
    }

    pub fn is_in_flight(&self, doc_id: &str) -> bool {
        self.in_flight.contains(doc_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted Transformer
// ─────────────────────────────────────────────────────────────────────────────

/// A transformer that replays queued answers, for tests and offline use.
///
/// With no answer queued it fails as an unreachable service would.
#[derive(Debug, Default)]
pub struct ScriptedTransformer {
    answers: VecDeque<Result<String>>,
    /// Every request received, in order
    pub requests: Vec<PolishRequest>,
}

impl ScriptedTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, text: impl Into<String>) -> Self {
        self.answers.push_back(Ok(text.into()));
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.answers
            .push_back(Err(Error::collaborator("polish", message)));
        self
    }
}

impl TextTransformer for ScriptedTransformer {
    fn transform(&mut self, request: &PolishRequest) -> Result<String> {
        self.requests.push(request.clone());
        self.answers
            .pop_front()
            .unwrap_or_else(|| Err(Error::collaborator("polish", "service unavailable")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_blocks_second_request() {
        let mut guard = PolishGuard::new();
        let ticket = guard.begin("doc", "text", None).unwrap();
        assert!(guard.is_in_flight("doc"));
        assert!(guard.begin("doc", "text", None).is_none());

        // Other documents are independent
        assert!(guard.begin("other", "text", None).is_some());

        guard.complete(&ticket, Ok("better".to_string())).unwrap();
        assert!(!guard.is_in_flight("doc"));
        assert!(guard.begin("doc", "text", None).is_some());
    }

    #[test]
    fn test_begin_skips_blank_content() {
        let mut guard = PolishGuard::new();
        assert!(guard.begin("doc", "  \n ", None).is_none());
        assert!(!guard.is_in_flight("doc"));
    }

    #[test]
    fn test_complete_success() {
        let mut guard = PolishGuard::new();
        let ticket = guard.begin("doc", "teh text", Some("fix typos")).unwrap();
        assert_eq!(ticket.request.instruction.as_deref(), Some("fix typos"));

        let result = guard.complete(&ticket, Ok("the text".to_string()));
        assert_eq!(result.unwrap().as_deref(), Some("the text"));
    }

    #[test]
    fn test_complete_empty_or_same_keeps_content() {
        let mut guard = PolishGuard::new();
        let ticket = guard.begin("doc", "text", None).unwrap();
        assert_eq!(guard.complete(&ticket, Ok("   ".to_string())).unwrap(), None);

        let ticket = guard.begin("doc", "text", None).unwrap();
        assert_eq!(guard.complete(&ticket, Ok("text".to_string())).unwrap(), None);
    }

    #[test]
    fn test_complete_failure_releases_guard() {
        let mut guard = PolishGuard::new();
        let ticket = guard.begin("doc", "text", None).unwrap();
        let err = guard
            .complete(&ticket, Err(Error::collaborator("polish", "no API key")))
            .unwrap_err();
        assert!(err.to_string().contains("no API key"));
        assert!(!guard.is_in_flight("doc"));
    }

    #[test]
    fn test_scripted_transformer() {
        let mut service = ScriptedTransformer::new().answer("one").fail("down");
        let request = PolishRequest {
            content: "x".to_string(),
            instruction: None,
        };
        assert_eq!(service.transform(&request).unwrap(), "one");
        assert!(service.transform(&request).is_err());
        assert!(service.transform(&request).is_err());
        assert_eq!(service.requests.len(), 3);
    }
}

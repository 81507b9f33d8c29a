//! AI helper transcript.

use intellidash_shared::{ChatHistory, ChatReply};

use crate::error::ApiError;

pub const FAILURE_REPLY: &str = "Sorry, there was an error processing your question.";
pub const GREETING: &str = "Hi! Ask me anything about your uploaded data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: usize,
    pub text: String,
    pub sender: Sender,
}

/// Append-only, ordered by insertion. Ids are positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> usize {
        let id = self.messages.len();
        self.messages.push(ChatMessage {
            id,
            text: text.into(),
            sender,
        });
        id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Loads `email`'s earlier questions from the server. The history is
    /// shared across accounts, so entries tagged with another user are
    /// skipped. Only an untouched transcript is seeded so a fast first
    /// question is never reordered.
    pub fn seed(&mut self, history: &ChatHistory, email: Option<&str>) -> bool {
        if !self.is_empty() {
            return false;
        }
        let own = history
            .messages
            .iter()
            .filter(|entry| entry.user.is_none() || entry.user.as_deref() == email);
        for entry in own {
            self.push(Sender::User, entry.message.clone());
        }
        !self.is_empty()
    }
}

/// `None` for a blank submission, otherwise the text to send.
pub fn prepare_question(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

/// Text for the AI bubble, or `None` when the request was cancelled.
pub fn reply_text(result: Result<ChatReply, ApiError>) -> Option<String> {
    match result {
        Ok(reply) => Some(
            reply
                .text()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(FAILURE_REPLY)
                .to_string(),
        ),
        Err(err) if err.is_cancelled() => None,
        Err(err) => {
            log::warn!("Chat request failed: {}", err);
            Some(FAILURE_REPLY.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intellidash_shared::ChatHistoryEntry;

    #[test]
    fn test_blank_questions_ignored() {
        assert_eq!(prepare_question("   \n"), None);
        assert_eq!(prepare_question(" top region? ").as_deref(), Some(" top region? "));
    }

    #[test]
    fn test_transcript_ids_follow_order() {
        let mut t = Transcript::new();
        assert_eq!(t.push(Sender::User, "q"), 0);
        assert_eq!(t.push(Sender::Ai, "a"), 1);
        let senders: Vec<_> = t.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Ai]);
    }

    #[test]
    fn test_reply_text_variants() {
        let reply = ChatReply {
            answer: Some("Revenue grew 12%".into()),
            message: None,
        };
        assert_eq!(reply_text(Ok(reply)).as_deref(), Some("Revenue grew 12%"));
        assert_eq!(reply_text(Ok(ChatReply::default())).as_deref(), Some(FAILURE_REPLY));
        assert_eq!(reply_text(Err(ApiError::Timeout)).as_deref(), Some(FAILURE_REPLY));
        assert_eq!(reply_text(Err(ApiError::Cancelled)), None);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let history = ChatHistory {
            messages: vec![ChatHistoryEntry {
                user: Some("a@b.com".into()),
                message: "earlier".into(),
                timestamp: None,
            }],
        };
        let mut fresh = Transcript::new();
        assert!(fresh.seed(&history, Some("a@b.com")));
        assert_eq!(fresh.messages()[0].text, "earlier");

        let mut busy = Transcript::new();
        busy.push(Sender::User, "now");
        assert!(!busy.seed(&history, Some("a@b.com")));
        assert_eq!(busy.len(), 1);
    }

    #[test]
    fn test_seed_skips_other_accounts() {
        let entry = |user: &str, message: &str| ChatHistoryEntry {
            user: Some(user.into()),
            message: message.into(),
            timestamp: None,
        };
        let history = ChatHistory {
            messages: vec![
                entry("me@x.com", "mine"),
                entry("other@x.com", "someone else's"),
                entry("me@x.com", "mine again"),
            ],
        };

        let mut t = Transcript::new();
        assert!(t.seed(&history, Some("me@x.com")));
        let texts: Vec<_> = t.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["mine", "mine again"]);

        let mut stranger = Transcript::new();
        assert!(!stranger.seed(&history, Some("nobody@x.com")));
        assert!(stranger.is_empty());
    }
}

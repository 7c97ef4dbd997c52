use crate::config::HISTORY_CHAR_BUDGET;
use crate::models::message::ChatMessage;

/// Per-user conversation state. Created by `/init_session`, dropped
/// when the process exits.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    pub authenticated: bool,
    pub history: Vec<ChatMessage>,
}

impl UserSession {
    pub fn new(authenticated: bool) -> Self {
        UserSession {
            authenticated,
            history: Vec::new(),
        }
    }

    /// Appends one user/assistant exchange and re-applies the budget.
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.history.push(user);
        self.history.push(assistant);
        self.trim_history(HISTORY_CHAR_BUDGET);
    }

    /// Drops the oldest messages until the history fits the character
    /// budget. The latest exchange is always retained.
    pub fn trim_history(&mut self, budget_chars: usize) {
        let mut total: usize = self
            .history
            .iter()
            .map(|message| message.content.chars().count())
            .sum();
        while self.history.len() > 2 && total > budget_chars {
            let removed = self.history.remove(0);
            total -= removed.content.chars().count();
        }
    }
}

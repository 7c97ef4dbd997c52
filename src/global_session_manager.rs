use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::UserSession;

/// Registry of per-user sessions, keyed by the UUID stored in the
/// session cookie. Sessions live for the process lifetime.
#[derive(Clone, Default)]
pub struct GlobalSessionManager {
    sessions: Arc<Mutex<HashMap<String, UserSession>>>,
}

impl GlobalSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session and returns its id.
    pub fn create(&self, authenticated: bool) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(session_id.clone(), UserSession::new(authenticated));
        session_id
    }

    /// Inserts or updates a session.
    pub fn insert(&self, session_id: String, session: UserSession) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(session_id, session);
    }

    /// Retrieves a session if it exists.
    pub fn get(&self, session_id: &str) -> Option<UserSession> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(session_id).cloned()
    }

    /// Marks a session authenticated. Returns false for unknown ids.
    pub fn set_authenticated(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.authenticated = true;
                true
            }
            None => false,
        }
    }

    /// Empties a session's history. Returns false for unknown ids.
    pub fn clear_history(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.history.clear();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::ChatMessage;

    #[test]
    fn create_get_and_clear_round_trip() {
        let manager = GlobalSessionManager::new();
        let session_id = manager.create(false);

        let mut session = manager.get(&session_id).unwrap();
        assert!(!session.authenticated);

        session
            .history
            .push(ChatMessage::user("hello".to_string()));
        manager.insert(session_id.clone(), session);
        assert_eq!(manager.get(&session_id).unwrap().history.len(), 1);

        assert!(manager.set_authenticated(&session_id));
        assert!(manager.get(&session_id).unwrap().authenticated);

        assert!(manager.clear_history(&session_id));
        assert!(manager.get(&session_id).unwrap().history.is_empty());
    }

    #[test]
    fn unknown_session_operations_return_false() {
        let manager = GlobalSessionManager::new();
        assert!(manager.get("missing").is_none());
        assert!(!manager.set_authenticated("missing"));
        assert!(!manager.clear_history("missing"));
    }
}

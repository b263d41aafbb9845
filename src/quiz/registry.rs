use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::quiz::session::{Question, QuizError, QuizSession, Verdict};

/// In-memory registry of active quiz sessions, one per user.
///
/// Sessions are ephemeral: starting a new quiz replaces the previous one,
/// abandoning drops it, and a restart loses them all. Nothing here is
/// persisted, matching the throwaway nature of a quiz pool.
#[derive(Debug, Default)]
pub struct QuizRegistry {
    sessions: RwLock<HashMap<String, QuizSession>>,
}

impl QuizRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly started session, replacing any previous one.
    pub async fn install(&self, user_id: &str, session: QuizSession) {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session);
    }

    /// The user's active question; `None` when no session exists,
    /// `Some(None)` when the session is Finished.
    pub async fn question(&self, user_id: &str) -> Option<Option<Question>> {
        let sessions = self.sessions.read().await;
        sessions.get(user_id).map(QuizSession::question)
    }

    pub async fn submit(&self, user_id: &str, input: &str) -> Option<Result<Verdict, QuizError>> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(user_id).map(|s| s.submit(input))
    }

    /// Abandons the user's session; returns false when none existed.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.sessions.write().await.remove(user_id).is_some()
    }
}

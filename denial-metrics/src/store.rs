use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use uuid::Uuid;

use crate::session::SessionState;

/// Handle to one dashboard session. Cheap to clone; the state is shared.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub state: Arc<Mutex<SessionState>>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }
}

/// In-memory session store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Session {
        let session = Session::new();
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    pub fn delete(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }
}

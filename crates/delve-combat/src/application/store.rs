//! In-memory session store.
//!
//! Each session sits behind its own mutex, so independent battles never wait
//! on one another. The outer map lock is held only long enough to clone the
//! session handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use delve_core::error::DomainError;
use uuid::Uuid;

use crate::domain::session::CombatSession;

type SessionHandle = Arc<Mutex<CombatSession>>;

/// Running sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
}

fn poisoned<E: std::fmt::Display>(what: &str, e: E) -> DomainError {
    DomainError::Infrastructure(format!("{what} mutex poisoned: {e}"))
}

impl SessionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `session` under its own id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionExists` if the id is taken.
    pub fn insert(&self, session: CombatSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.lock().map_err(|e| poisoned("store", e))?;
        if sessions.contains_key(&session.id) {
            return Err(DomainError::SessionExists(session.id));
        }
        sessions.insert(session.id, Arc::new(Mutex::new(session)));
        Ok(())
    }

    /// Runs `f` with exclusive access to the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` for an unknown id and
    /// `DomainError::Infrastructure` if a lock is poisoned.
    pub fn with_session<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut CombatSession) -> R,
    ) -> Result<R, DomainError> {
        let handle = {
            let sessions = self.sessions.lock().map_err(|e| poisoned("store", e))?;
            sessions
                .get(&session_id)
                .cloned()
                .ok_or(DomainError::SessionNotFound(session_id))?
        };
        let mut session = handle.lock().map_err(|e| poisoned("session", e))?;
        Ok(f(&mut session))
    }

    /// Drops the session, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn remove(&self, session_id: Uuid) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.lock().map_err(|e| poisoned("store", e))?;
        Ok(sessions.remove(&session_id).is_some())
    }

    /// Number of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn len(&self) -> Result<usize, DomainError> {
        let sessions = self.sessions.lock().map_err(|e| poisoned("store", e))?;
        Ok(sessions.len())
    }

    /// True when no sessions are stored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::Attributes;
    use crate::domain::combatant::CombatantSpec;
    use crate::domain::rules::CombatRules;
    use delve_test_support::fixed_clock;

    fn session(id: Uuid) -> CombatSession {
        CombatSession::new(
            id,
            vec![
                CombatantSpec::player(Uuid::new_v4(), "Hero", Attributes::new(5, 3, 2)),
                CombatantSpec::creature(Uuid::new_v4(), "Rat", Attributes::new(1, 2, 1)),
            ],
            CombatRules::default(),
            Uuid::new_v4(),
            &fixed_clock(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_access() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert(session(id)).unwrap();

        let turn = store.with_session(id, |s| s.turn_counter()).unwrap();
        assert_eq!(turn, 1);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_insert_duplicate_id_is_rejected() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert(session(id)).unwrap();

        let result = store.insert(session(id));
        assert!(matches!(result, Err(DomainError::SessionExists(got)) if got == id));
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        let result = store.with_session(id, |_| ());
        assert!(matches!(result, Err(DomainError::SessionNotFound(got)) if got == id));
    }

    #[test]
    fn test_mutation_is_kept() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert(session(id)).unwrap();

        let drained = store.with_session(id, |s| s.drain_events().len()).unwrap();
        assert_eq!(drained, 1);
        let left = store
            .with_session(id, |s| s.uncommitted_events().len())
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert(session(id)).unwrap();

        assert!(store.remove(id).unwrap());
        assert!(!store.remove(id).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_sessions_are_independent_across_threads() {
        let store = Arc::new(SessionStore::new());
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            store.insert(session(*id)).unwrap();
        }

        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let store = Arc::clone(&store);
                let id = *id;
                std::thread::spawn(move || store.with_session(id, |s| s.id).unwrap())
            })
            .collect();

        for (handle, id) in handles.into_iter().zip(&ids) {
            assert_eq!(handle.join().unwrap(), *id);
        }
    }
}

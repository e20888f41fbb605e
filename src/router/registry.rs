//! Handle registry
//!
//! Maps registered handles to the session that owns them. Owned by the
//! router control loop; nothing else holds it.

use std::collections::HashMap;

use crate::client::{Outbound, SessionId};
use crate::error::RegistryError;

/// Routing target for one registered handle
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    session: SessionId,
    outbound: Outbound,
}

impl RegistryEntry {
    pub fn new(session: SessionId, outbound: Outbound) -> Self {
        Self { session, outbound }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }
}

/// Registry of currently registered handles
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `handle` for the entry's session, releasing `previous` in the
    /// same step when the session is renaming.
    ///
    /// Fails without touching the registry if the handle is taken, even by
    /// the claiming session itself.
    pub fn claim(
        &mut self,
        handle: &str,
        previous: Option<&str>,
        entry: RegistryEntry,
    ) -> Result<(), RegistryError> {
        if self.contains(handle) {
            return Err(RegistryError::HandleInUse(handle.to_string()));
        }

        if let Some(previous) = previous {
            self.release(previous, entry.session);
        }

        self.entries.insert(handle.to_string(), entry);
        Ok(())
    }

    /// Remove `handle` if it still belongs to `session`.
    ///
    /// Returns whether an entry was removed. A stale release for a handle
    /// since claimed by another session is a no-op.
    pub fn release(&mut self, handle: &str, session: SessionId) -> bool {
        match self.entries.get(handle) {
            Some(entry) if entry.session == session => {
                self.entries.remove(handle);
                true
            }
            _ => false,
        }
    }

    /// Remove every handle held by `session`, returning what was removed.
    ///
    /// Used at teardown, when the session's own view of its handle may be
    /// behind the registry's.
    pub fn release_session(&mut self, session: SessionId) -> Vec<String> {
        let handles: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.session == session)
            .map(|(handle, _)| handle.clone())
            .collect();

        for handle in &handles {
            self.entries.remove(handle);
        }
        handles
    }

    pub fn get(&self, handle: &str) -> Option<&RegistryEntry> {
        self.entries.get(handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Snapshot of the registered handles, in no particular order
    pub fn handles(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn entry(session: SessionId) -> RegistryEntry {
        let (tx, _rx) = mpsc::channel(1);
        RegistryEntry::new(session, tx)
    }

    #[test]
    fn test_claim_unique_handle() {
        let mut registry = Registry::new();
        let a = SessionId::next();
        let b = SessionId::next();

        assert!(registry.claim("alice", None, entry(a)).is_ok());
        assert_eq!(
            registry.claim("alice", None, entry(b)),
            Err(RegistryError::HandleInUse("alice".into()))
        );
        assert_eq!(registry.get("alice").unwrap().session(), a);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reclaiming_own_handle_is_in_use() {
        let mut registry = Registry::new();
        let a = SessionId::next();

        registry.claim("alice", None, entry(a)).unwrap();
        assert!(registry.claim("alice", Some("alice"), entry(a)).is_err());
        assert!(registry.contains("alice"));
    }

    #[test]
    fn test_rename_replaces_old_handle() {
        let mut registry = Registry::new();
        let a = SessionId::next();

        registry.claim("alice", None, entry(a)).unwrap();
        registry.claim("alicia", Some("alice"), entry(a)).unwrap();

        assert!(!registry.contains("alice"));
        assert_eq!(registry.get("alicia").unwrap().session(), a);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_rename_keeps_old_handle() {
        let mut registry = Registry::new();
        let a = SessionId::next();
        let b = SessionId::next();

        registry.claim("alice", None, entry(a)).unwrap();
        registry.claim("bob", None, entry(b)).unwrap();

        assert!(registry.claim("bob", Some("alice"), entry(a)).is_err());
        assert_eq!(registry.get("alice").unwrap().session(), a);
        assert_eq!(registry.get("bob").unwrap().session(), b);
    }

    #[test]
    fn test_stale_release_keeps_new_claimant() {
        let mut registry = Registry::new();
        let old = SessionId::next();
        let new = SessionId::next();

        registry.claim("alice", None, entry(old)).unwrap();
        assert!(registry.release("alice", old));
        registry.claim("alice", None, entry(new)).unwrap();

        assert!(!registry.release("alice", old));
        assert_eq!(registry.get("alice").unwrap().session(), new);
    }

    #[test]
    fn test_rename_does_not_release_foreign_previous() {
        let mut registry = Registry::new();
        let a = SessionId::next();
        let b = SessionId::next();

        registry.claim("bob", None, entry(b)).unwrap();
        registry.claim("alice", Some("bob"), entry(a)).unwrap();

        assert_eq!(registry.get("bob").unwrap().session(), b);
        assert_eq!(registry.get("alice").unwrap().session(), a);
    }

    #[test]
    fn test_release_session_removes_only_its_entries() {
        let mut registry = Registry::new();
        let a = SessionId::next();
        let b = SessionId::next();

        registry.claim("alice", None, entry(a)).unwrap();
        registry.claim("bob", None, entry(b)).unwrap();

        assert_eq!(registry.release_session(a), vec!["alice".to_string()]);
        assert!(!registry.contains("alice"));
        assert_eq!(registry.get("bob").unwrap().session(), b);

        assert!(registry.release_session(a).is_empty());
    }

    #[test]
    fn test_handles_snapshot() {
        let mut registry = Registry::new();
        assert!(registry.handles().is_empty());

        registry.claim("alice", None, entry(SessionId::next())).unwrap();
        registry.claim("bob", None, entry(SessionId::next())).unwrap();

        let mut handles = registry.handles();
        handles.sort();
        assert_eq!(handles, vec!["alice".to_string(), "bob".to_string()]);
    }
}

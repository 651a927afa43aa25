//! The subscription log
//!
//! The log maps each client to its mirror root and the modules and files it
//! subscribes to. It is persisted as pretty-printed JSON inside the shared
//! tree:
//!
//! ```json
//! {
//!   "app": {
//!     "path": "clients/app/src/shared",
//!     "file": ["lib/a.ts"],
//!     "module": ["comp/"]
//!   }
//! }
//! ```

mod store;

pub use store::{LogGuard, LogStore};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One client's subscriptions.
///
/// Lists keep insertion order. After every successful subscribe no entry in
/// `file` lies under an entry in `module`, and no module lies under another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Mirror root, relative to the workspace root
    pub path: String,
    /// Single-file subscriptions
    #[serde(default)]
    pub file: Vec<String>,
    /// Module (directory prefix) subscriptions, each ending in `/`
    #[serde(default)]
    pub module: Vec<String>,
}

impl ClientRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: Vec::new(),
            module: Vec::new(),
        }
    }

    pub fn modules(&self) -> &[String] {
        &self.module
    }

    pub fn files(&self) -> &[String] {
        &self.file
    }

    /// The first module subscription that covers `path`, if any.
    pub fn covering_module(&self, path: &str) -> Option<&str> {
        self.module
            .iter()
            .find(|module| path.starts_with(module.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.module.is_empty()
    }
}

/// Every client's subscriptions, keyed by client name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionLog {
    clients: BTreeMap<String, ClientRecord>,
}

impl SubscriptionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn client(&self, name: &str) -> Option<&ClientRecord> {
        self.clients.get(name)
    }

    /// Insert or replace a client's record.
    pub fn insert(&mut self, name: impl Into<String>, record: ClientRecord) {
        self.clients.insert(name.into(), record);
    }

    /// Iterate over `(client, record)` pairs in name order.
    pub fn clients(&self) -> impl Iterator<Item = (&str, &ClientRecord)> {
        self.clients.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Parse the persisted JSON form.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Render the persisted JSON form (two-space indent).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_persisted_format() {
        let log = SubscriptionLog::from_json(
            r#"{
  "donation": {
    "path": "clients/donation/src/shared",
    "file": ["library/server/address.ts"],
    "module": ["components/"]
  }
}"#,
        )
        .unwrap();

        let record = log.client("donation").unwrap();
        assert_eq!(record.path, "clients/donation/src/shared");
        assert_eq!(record.files(), ["library/server/address.ts".to_string()]);
        assert_eq!(record.modules(), ["components/".to_string()]);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let log = SubscriptionLog::from_json(r#"{"app": {"path": "clients/app/src/shared"}}"#)
            .unwrap();
        assert!(log.client("app").unwrap().is_empty());
    }

    #[test]
    fn serializes_as_flat_client_map() {
        let mut log = SubscriptionLog::new();
        let mut record = ClientRecord::new("clients/app/src/shared");
        record.module.push("comp/".to_string());
        log.insert("app", record);

        let json = log.to_json().unwrap();
        assert!(json.starts_with("{\n  \"app\": {"));
        assert_eq!(SubscriptionLog::from_json(&json).unwrap(), log);
    }

    #[test]
    fn covering_module_uses_prefix_match() {
        let mut record = ClientRecord::new("clients/app/src/shared");
        record.module.push("a/".to_string());

        assert_eq!(record.covering_module("a/b/c.ts"), Some("a/"));
        assert_eq!(record.covering_module("ab/c.ts"), None);
    }
}

//! Path resolution for the shared tree, client roots, and the log

use fanout_fs::{NormalizedPath, ReservedArtifacts, ReservedNames, validate_segment};

use super::FanoutConfig;
use crate::Result;

/// Resolves every location the synchronizer touches from a workspace root
/// and its config.
#[derive(Debug, Clone)]
pub struct Layout {
    root: NormalizedPath,
    config: FanoutConfig,
    reserved: ReservedNames,
}

impl Layout {
    pub fn new(root: NormalizedPath, config: FanoutConfig) -> Self {
        let reserved = ReservedNames::new(config.log_file.clone());
        Self {
            root,
            config,
            reserved,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &FanoutConfig {
        &self.config
    }

    pub fn reserved(&self) -> &ReservedNames {
        &self.reserved
    }

    /// Log artifacts as they sit on disk, directly under the shared root.
    pub fn reserved_artifacts(&self) -> ReservedArtifacts {
        ReservedArtifacts::new(self.shared_root().to_native(), self.reserved.clone())
    }

    /// The shared tree.
    pub fn shared_root(&self) -> NormalizedPath {
        self.root.join(&self.config.shared_dir)
    }

    /// A path inside the shared tree.
    pub fn shared_path(&self, rel: &str) -> NormalizedPath {
        self.shared_root().join(rel)
    }

    pub fn clients_root(&self) -> NormalizedPath {
        self.root.join(&self.config.clients_dir)
    }

    pub fn client_root(&self, client: &str) -> NormalizedPath {
        self.clients_root().join(client)
    }

    /// The mirror root of a client as recorded in the log: relative to the
    /// workspace root, forward slashes.
    pub fn mirror_record(&self, client: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.clients_dir.trim_end_matches('/'),
            client,
            self.config.mirror_subdir.trim_matches('/')
        )
    }

    /// Resolve a recorded mirror root against the workspace root.
    pub fn resolve_record(&self, record: &str) -> NormalizedPath {
        self.root.join(record)
    }

    pub fn mirror_root(&self, client: &str) -> NormalizedPath {
        self.resolve_record(&self.mirror_record(client))
    }

    pub fn log_path(&self) -> NormalizedPath {
        self.shared_root().join(self.reserved.log_file())
    }

    pub fn lock_path(&self) -> NormalizedPath {
        self.shared_root().join(&self.reserved.lock_file())
    }

    /// A client is known when its directory exists and is not the shared
    /// tree itself (or inside it).
    pub fn is_known_client(&self, client: &str) -> bool {
        if validate_segment(client).is_err() {
            return false;
        }
        let client_root = self.client_root(client);
        let shared = self.shared_root();
        let inside_shared = client_root == shared
            || client_root
                .as_str()
                .starts_with(&format!("{}/", shared.as_str().trim_end_matches('/')));
        client_root.is_dir() && !inside_shared
    }

    /// Names of every client directory, sorted. The shared tree is skipped
    /// when it lives inside the clients directory.
    pub fn list_clients(&self) -> Result<Vec<String>> {
        let clients_root = self.clients_root();
        let entries = match std::fs::read_dir(clients_root.to_native()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(fanout_fs::Error::io(clients_root.to_native(), e).into()),
        };

        let mut clients: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| self.is_known_client(name))
            .collect();
        clients.sort();
        Ok(clients)
    }
}

//! Common types for the V2V environment boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a vehicle/agent.
///
/// The core treats this as an opaque string key: it is generated once per
/// local agent and retained across sessions by the storage collaborator.
/// Peer ids arrive as-is on the fleet feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Generates a new random AgentId.
    ///
    /// Uses a UUID v4 rendered without hyphens; uniqueness without
    /// coordination is all that is required.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Creates an AgentId from an existing key (e.g. off the feed).
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates a deterministic AgentId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes).simple().to_string())
    }

    /// Returns the id as a string key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability. Peer ids are arbitrary keys
        // off the feed, so truncate by characters, not bytes.
        for c in self.0.chars().take(8) {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_deterministic() {
        assert_eq!(AgentId::from_seed(7), AgentId::from_seed(7));
        assert_ne!(AgentId::from_seed(7), AgentId::from_seed(8));
    }

    #[test]
    fn test_generate_unique() {
        assert_ne!(AgentId::generate(), AgentId::generate());
    }

    #[test]
    fn test_display_truncates() {
        let id = AgentId::from_key("abcdefghijklmnop");
        assert_eq!(id.to_string(), "abcdefgh");
    }

    #[test]
    fn test_display_truncates_multibyte_keys() {
        // Keys arrive as-is off the feed and may be multibyte; truncation
        // must not split a character.
        let id = AgentId::from_key("aααααα");
        assert_eq!(id.to_string(), "aααααα");

        let long = AgentId::from_key("ααααααααββ");
        assert_eq!(long.to_string(), "αααααααα");

        let short = AgentId::from_key("αβ");
        assert_eq!(short.to_string(), "αβ");
    }
}

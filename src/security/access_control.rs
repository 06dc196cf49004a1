//! Owner-based access control.
//!
//! Enforces the allow/deny prefix lists against the identity captured from
//! a matched upstream URL.

use serde::{Deserialize, Serialize};

/// Why an identity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The allow list is non-empty and no entry prefixes the identity.
    NotAllowed,
    /// An entry of the deny list prefixes the identity.
    Blocked,
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Denial::NotAllowed => write!(f, "Not in the allow list, access restricted."),
            Denial::Blocked => write!(f, "Access blocked by the deny list."),
        }
    }
}

/// Allow/deny lists of owner prefixes.
///
/// An empty list imposes no restriction. Entries match by plain string
/// prefix, so `"alice"` also covers `"alice-org"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessPolicy {
    /// Owner prefixes admitted when non-empty.
    #[serde(default, alias = "whiteList")]
    pub allow: Vec<String>,

    /// Owner prefixes refused.
    #[serde(default, alias = "blackList")]
    pub deny: Vec<String>,
}

impl AccessPolicy {
    pub fn new(allow: Vec<String>, deny: Vec<String>) -> Self {
        Self { allow, deny }
    }

    /// Decide admission for the captures of a matched upstream URL.
    ///
    /// Only the first capture is consulted. Empty captures fail closed.
    pub fn admit(&self, captures: &[String]) -> Result<(), Denial> {
        let Some(identity) = captures.first() else {
            return Err(Denial::NotAllowed);
        };

        if !self.allow.is_empty() && !has_prefix_entry(&self.allow, identity) {
            return Err(Denial::NotAllowed);
        }
        if !self.deny.is_empty() && has_prefix_entry(&self.deny, identity) {
            return Err(Denial::Blocked);
        }
        Ok(())
    }
}

fn has_prefix_entry(list: &[String], identity: &str) -> bool {
    list.iter().any(|entry| identity.starts_with(entry.as_str()))
}

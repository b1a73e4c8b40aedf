//! Command vocabulary shared by the proxy and the offline backup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keyword parameters passed along with a command.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// A command name outside the fixed vocabulary was given.
///
/// This is a contract violation by the caller, not a runtime condition; it is
/// deliberately not part of [`crate::ProxyError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

/// The fixed command vocabulary of the webservice API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// List the entries of a collection, optionally filtered.
    List,
    /// Add an entry to a collection.
    Add,
    /// Remove an entry from a collection.
    Remove,
    /// Fetch a single entry.
    Get,
    /// Update fields of an entry.
    Update,
    /// Copy an entry between collections.
    Copy,
    /// Create a new collection.
    CollectionCreate,
    /// Query the webservice version.
    ServerInfo,
}

impl CommandKind {
    /// Whether the command changes server-side state.
    ///
    /// Only mutating commands are eligible for offline backup; replaying a
    /// read has no meaning.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Remove | Self::Update | Self::Copy | Self::CollectionCreate
        )
    }

    /// The kebab-case name used on the wire and in the backup file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Get => "get",
            Self::Update => "update",
            Self::Copy => "copy",
            Self::CollectionCreate => "collection-create",
            Self::ServerInfo => "server-info",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "get" => Ok(Self::Get),
            "update" => Ok(Self::Update),
            "copy" => Ok(Self::Copy),
            "collection-create" => Ok(Self::CollectionCreate),
            "server-info" => Ok(Self::ServerInfo),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The state a key should be in once a run completes.
///
/// `latest` and `refreshed` are the same state: present, and refreshed
/// from a keyserver on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    #[default]
    Present,
    #[serde(alias = "refreshed")]
    Latest,
    Absent,
}

impl DesiredState {
    /// True for every state that requires the key to exist afterwards.
    pub fn wants_key(self) -> bool {
        matches!(self, Self::Present | Self::Latest)
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "latest" | "refreshed" => Ok(Self::Latest),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "unknown state '{other}' (expected present, latest, refreshed or absent)"
            )),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Present => "present",
            Self::Latest => "latest",
            Self::Absent => "absent",
        };
        f.pad(s)
    }
}

/// Kind of key material the run is about.
///
/// Identity-only runs (no key file) always use `Private`, which makes the
/// engine fetch the key from a keyserver when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    #[default]
    Private,
    Public,
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            other => Err(format!(
                "unknown key type '{other}' (expected private or public)"
            )),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.pad("private"),
            Self::Public => f.pad("public"),
        }
    }
}

/// Where the key material comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySource {
    pub key_type: KeyType,
    /// A local key file was supplied.
    pub from_file: bool,
}

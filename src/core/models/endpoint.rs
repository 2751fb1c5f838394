use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheme given to bare hostnames.
pub const DEFAULT_SCHEME: &str = "hkp://";

/// Keyserver URL schemes accepted as-is.
const KNOWN_SCHEMES: &[&str] = &["hkp://", "hkps://"];

/// A keyserver URL, always carrying an `hkp://` or `hkps://` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Normalize one server entry. Entries that already start with a known
    /// scheme are kept verbatim, everything else is prefixed with `hkp://`.
    pub fn normalize(server: &str) -> Self {
        if KNOWN_SCHEMES.iter().any(|s| server.starts_with(s)) {
            Self(server.to_string())
        } else {
            Self(format!("{DEFAULT_SCHEME}{server}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Normalize a server list, keeping its order.
///
/// The order is the order endpoints are tried in on every retry round.
pub fn normalize_servers<S: AsRef<str>>(servers: &[S]) -> Vec<Endpoint> {
    servers
        .iter()
        .map(|s| Endpoint::normalize(s.as_ref()))
        .collect()
}

//! Route-change payload supplied by the host router.

use serde::{Deserialize, Serialize};

/// The route navigated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Named route, when the router has one.
    pub name: Option<String>,
    /// Full path including query string.
    pub path: String,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: path.into(),
        }
    }

    /// A route without a name.
    pub fn unnamed(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
        }
    }
}

/// Parses `NAME=PATH` or a bare `PATH`.
impl std::str::FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = match s.split_once('=') {
            Some((name, path)) => (Some(name.trim()), path.trim()),
            None => (None, s.trim()),
        };
        if !path.starts_with('/') {
            return Err(format!("route path must start with '/': {s:?}"));
        }
        Ok(Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            path: path.to_string(),
        })
    }
}

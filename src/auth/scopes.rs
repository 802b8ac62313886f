//! Scope vocabulary and normalization.
//!
//! Tokens carry a set drawn from `{read, write}`. Normalization always adds
//! `read` so that `write` implies `read`; the canonical rendering is the
//! space-separated, sorted list of lowercase scope names.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::AuthError;

/// A single named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Read,
    Write,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::Write => "write",
        }
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Scope::Read),
            "write" => Ok(Scope::Write),
            _ => Err(AuthError::InvalidScopes),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, non-empty scope set that always contains [`Scope::Read`].
///
/// The only way to build one is [`ScopeSet::normalize`] (or its `FromStr`
/// alias), so every value held by the crate is already canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    /// Validate a whitespace separated scope string and add the implied `read`.
    pub fn normalize(raw: &str) -> Result<Self, AuthError> {
        let mut scopes = BTreeSet::new();
        for name in raw.split_whitespace() {
            scopes.insert(name.parse::<Scope>()?);
        }

        if scopes.is_empty() {
            return Err(AuthError::InvalidScopes);
        }

        scopes.insert(Scope::Read);
        Ok(Self(scopes))
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }
}

impl FromStr for ScopeSet {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

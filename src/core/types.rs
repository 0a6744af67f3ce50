//! core::types
//!
//! Strong types for the two names this tool passes around constantly:
//! branch names and remote names.
//!
//! Both types enforce validity at construction time, so an invalid name
//! cannot travel through the sync engine and surface as a confusing git
//! error halfway through a run.
//!
//! # Examples
//!
//! ```
//! use headwater::core::types::{BranchName, RemoteName};
//!
//! let branch = BranchName::new("feature/login").unwrap();
//! assert_eq!(branch.as_str(), "feature/login");
//!
//! let remote = RemoteName::new("upstream").unwrap();
//! assert!(remote.is_upstream());
//!
//! assert!(BranchName::new("bad..name").is_err());
//! assert!(RemoteName::new("no/slashes").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from name validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid remote name: {0}")]
    InvalidRemoteName(String),
}

/// A validated git branch name.
///
/// Validation follows the refname rules git itself enforces (see
/// `git check-ref-format`): no empty names, no leading `.` or `-`, no
/// trailing `/` or `.lock`, none of git's reserved sequences or
/// metacharacters, and no control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidBranchName`] when the name violates
    /// git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let fail = |why: &str| Err(TypeError::InvalidBranchName(format!("{why}: {name:?}")));

        if name.is_empty() {
            return fail("branch name is empty");
        }
        if name == "@" {
            return fail("'@' is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return fail("branch name starts with '.' or '-'");
        }
        if name.ends_with('/') || name.ends_with(".lock") {
            return fail("branch name ends with '/' or '.lock'");
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return fail("branch name contains a reserved sequence");
            }
        }
        if name
            .chars()
            .any(|c| c.is_ascii_control() || " ~^:\\?*[".contains(c))
        {
            return fail("branch name contains an invalid character");
        }
        // Per-component rules for hierarchical names like feature/x.
        for part in name.split('/') {
            if part.starts_with('.') || part.ends_with(".lock") {
                return fail("branch name component starts with '.' or ends with '.lock'");
            }
        }

        Ok(())
    }

    /// The branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A validated git remote name.
///
/// Remote names are a flat namespace: non-empty, no whitespace, no `/`,
/// no control characters. The two names this tool cares about have
/// dedicated constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Create a validated remote name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidRemoteName`] for empty names or names
    /// containing `/`, whitespace, or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidRemoteName("remote name is empty".into()));
        }
        if name
            .chars()
            .any(|c| c == '/' || c.is_whitespace() || c.is_ascii_control())
        {
            return Err(TypeError::InvalidRemoteName(format!(
                "remote name contains an invalid character: {name:?}"
            )));
        }
        Ok(Self(name))
    }

    /// The conventional name of a personal fork remote.
    pub fn origin() -> Self {
        Self("origin".into())
    }

    /// The conventional name of a shared source-of-truth remote.
    pub fn upstream() -> Self {
        Self("upstream".into())
    }

    /// Whether this remote is literally named `upstream`.
    ///
    /// The fork-push policy keys off this exact name.
    pub fn is_upstream(&self) -> bool {
        self.0 == "upstream"
    }

    /// The remote name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteName> for String {
    fn from(value: RemoteName) -> Self {
        value.0
    }
}

impl std::fmt::Display for RemoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RemoteName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_plain_and_hierarchical_names() {
            for name in ["main", "master", "feature/login", "user@feature", "v1.2"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_refname_violations() {
            for name in [
                "",
                "@",
                ".hidden",
                "-flag",
                "trailing/",
                "branch.lock",
                "a..b",
                "a@{b",
                "a//b",
                "has space",
                "wild*card",
                "feature/.hidden",
            ] {
                assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn compares_against_str() {
            let name = BranchName::new("main").unwrap();
            assert_eq!(name, *"main");
            assert_ne!(name, *"master");
        }

        #[test]
        fn serde_round_trip() {
            let name = BranchName::new("feature/x").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"feature/x\"");
            let back: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(back, name);
        }

        #[test]
        fn serde_rejects_invalid() {
            assert!(serde_json::from_str::<BranchName>("\"a..b\"").is_err());
        }
    }

    mod remote_name {
        use super::*;

        #[test]
        fn accepts_conventional_names() {
            assert_eq!(RemoteName::new("origin").unwrap(), RemoteName::origin());
            assert_eq!(RemoteName::new("upstream").unwrap(), RemoteName::upstream());
            assert!(RemoteName::new("fork2").is_ok());
        }

        #[test]
        fn rejects_invalid_names() {
            for name in ["", "a/b", "has space", "tab\tname"] {
                assert!(RemoteName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn upstream_check_is_literal() {
            assert!(RemoteName::upstream().is_upstream());
            assert!(!RemoteName::origin().is_upstream());
            assert!(!RemoteName::new("Upstream").unwrap().is_upstream());
        }
    }
}

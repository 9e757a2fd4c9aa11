//! Per-user name prefixes.

use std::fmt;

/// The name prefix under which a user's images are stored.
///
/// Derived from the display name with every whitespace run replaced by `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(String);

impl Owner {
    /// Derives the owner prefix from a display name.
    #[must_use]
    pub fn from_display_name(display_name: &str) -> Self {
        Self(display_name.split_whitespace().collect::<Vec<_>>().join("_"))
    }

    /// Returns the owner name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `pathname` belongs to this owner.
    #[must_use]
    pub fn owns(&self, pathname: &str) -> bool {
        pathname
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

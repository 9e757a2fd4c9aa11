//! Shared site password that unlocks the gallery without a Discord login.

/// The configured site password, if any.
///
/// With no password configured every attempt is refused.
#[derive(Clone, Default)]
pub struct SitePassword(Option<String>);

impl SitePassword {
    /// Wraps the configured password.
    #[must_use]
    pub fn new(password: Option<String>) -> Self {
        Self(password.filter(|p| !p.is_empty()))
    }

    /// Returns true if a password is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Checks `candidate` against the configured password.
    ///
    /// Compares every byte regardless of where the first mismatch is.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(expected) = &self.0 else {
            return false;
        };
        let (expected, candidate) = (expected.as_bytes(), candidate.as_bytes());
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for SitePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitePassword")
            .field("configured", &self.is_configured())
            .finish()
    }
}

//! Account email addresses.
//!
//! The pizza service uses the email as the login key and enforces its
//! uniqueness. The client only rejects input that cannot be an address at
//! all, so a typo fails before a round trip.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Zero or several `@` separators.
    #[error("email must contain exactly one @")]
    AtSymbols,
    #[error("email needs text before the @")]
    EmptyLocalPart,
    #[error("email needs a domain after the @")]
    EmptyDomain,
}

/// A structurally valid email address.
///
/// Decoding from JSON goes through the same check as [`Email::parse`].
///
/// ```
/// use jwt_pizza_core::Email;
///
/// assert!(Email::parse("d@jwt.com").is_ok());
/// assert!(Email::parse("d@jwt@com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Check and wrap an address exactly as given.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first broken rule.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::AtSymbols)?;
        if domain.contains('@') {
            return Err(EmailError::AtSymbols);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Parse after trimming surrounding whitespace, as typed into a form.
    ///
    /// # Errors
    ///
    /// Same as [`Email::parse`].
    pub fn parse_input(s: &str) -> Result<Self, EmailError> {
        Self::parse(s.trim())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)?;
        Ok(Self(s))
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Session store.
//!
//! Holds the currently authenticated user and the auth token the service
//! issued for them. Both are set and cleared together, so a session always
//! has zero or one active user.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use jwt_pizza_core::{Roles, User};

/// Bearer token issued by the pizza service on login, registration, and
/// profile updates.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    /// The raw token. Only for persisting it.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// The client-held record of who is logged in.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
    token: Option<AuthToken>,
}

impl Session {
    /// An empty, logged-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful login or registration.
    ///
    /// Replaces any previous user.
    pub fn establish(&mut self, user: User, token: AuthToken) {
        debug!(user_id = %user.id, "Session established");
        self.user = Some(user);
        self.token = Some(token);
    }

    /// Record a profile update. The service reissues the token on update.
    pub fn update_user(&mut self, user: User, token: AuthToken) {
        debug!(user_id = %user.id, "Session user updated");
        self.user = Some(user);
        self.token = Some(token);
    }

    /// Hold a token whose user is not known yet (restored from disk).
    ///
    /// The caller is expected to resolve the user immediately and either
    /// [`establish`](Self::establish) or [`clear`](Self::clear).
    pub(crate) fn adopt_token(&mut self, token: AuthToken) {
        self.user = None;
        self.token = Some(token);
    }

    /// Log out locally.
    pub fn clear(&mut self) {
        if let Some(user) = self.user.take() {
            debug!(user_id = %user.id, "Session cleared");
        }
        self.token = None;
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Whether a user is logged in. A bare token does not count.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Roles of the current user, or `None` when logged out.
    #[must_use]
    pub fn roles(&self) -> Option<&Roles> {
        self.user.as_ref().map(|user| &user.roles)
    }
}

// =============================================================================
// Token persistence
// =============================================================================

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Persists the auth token between runs, the way a browser keeps it in
/// local storage.
///
/// Only the token is stored. The user is fetched again on restore so role
/// changes made on the server are picked up.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing file means no stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> std::io::Result<Option<AuthToken>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let stored: StoredToken = serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if stored.token.is_empty() {
            return Ok(None);
        }

        debug!("Loaded stored token");
        Ok(Some(AuthToken::new(stored.token)))
    }

    /// Store the token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self, token), fields(path = %self.path.display()))]
    pub fn save(&self, token: &AuthToken) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_vec(&StoredToken {
            token: token.expose().to_string(),
        })
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(&body)?;
        debug!("Stored token");
        Ok(())
    }

    /// Forget the stored token. Removing a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jwt_pizza_core::{Email, RoleGrant, RoleKind, UserId};

    use super::*;

    fn diner() -> User {
        User {
            id: UserId::new(3),
            name: "Kai Chen".to_string(),
            email: Email::parse("d@jwt.com").unwrap(),
            roles: Roles::new(vec![RoleGrant::new(RoleKind::Diner)]),
        }
    }

    fn scratch_file(name: &str) -> TokenFile {
        let dir = std::env::temp_dir().join(format!("jwt-pizza-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        TokenFile::new(dir.join("session.json"))
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
        assert!(session.roles().is_none());
    }

    #[test]
    fn test_establish_then_clear() {
        let mut session = Session::new();
        session.establish(diner(), AuthToken::new("abcdef"));
        assert!(session.is_logged_in());
        assert!(session.roles().unwrap().has(RoleKind::Diner));
        assert_eq!(session.token().unwrap().bearer(), "Bearer abcdef");

        session.clear();
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_establish_replaces_previous_user() {
        let mut session = Session::new();
        session.establish(diner(), AuthToken::new("abcdef"));

        let mut admin = diner();
        admin.id = UserId::new(5);
        admin.name = "Ad Min".to_string();
        session.establish(admin, AuthToken::new("ghijkl"));

        assert_eq!(session.user().unwrap().id, UserId::new(5));
        assert_eq!(session.token().unwrap().expose(), "ghijkl");
    }

    #[test]
    fn test_adopted_token_is_not_logged_in() {
        let mut session = Session::new();
        session.adopt_token(AuthToken::new("abcdef"));
        assert!(!session.is_logged_in());
        assert!(session.token().is_some());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AuthToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }

    #[test]
    fn test_token_file_round_trip() {
        let file = scratch_file("round-trip");
        assert!(file.load().unwrap().is_none());

        file.save(&AuthToken::new("abcdef")).unwrap();
        assert_eq!(file.load().unwrap().unwrap().expose(), "abcdef");

        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
        file.remove().unwrap();
    }

    #[test]
    fn test_token_file_rejects_garbage() {
        let file = scratch_file("garbage");
        std::fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        let err = file.load().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}

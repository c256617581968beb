//! Player authentication
//!
//! Registration, login and bearer-token session handling. Passwords are
//! stored as salted SHA-256 digests; sessions are opaque random tokens kept
//! server-side with an expiry.

mod token;
mod username;

pub use token::generate_session_token;
pub use username::generate_username;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::domain::{Player, Role, StepId};
use crate::error::AppError;
use crate::store::{NewPlayer, PlayerStore, SessionStore};

const MIN_PASSWORD_LEN: usize = 6;
const USERNAME_RETRIES: u32 = 50;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Authentication and session service
#[derive(Clone)]
pub struct AuthService {
    players: PlayerStore,
    sessions: SessionStore,
    token_ttl_millis: i64,
    starting_step: StepId,
}

impl AuthService {
    pub fn new(
        players: PlayerStore,
        sessions: SessionStore,
        token_ttl_millis: i64,
        starting_step: StepId,
    ) -> Self {
        Self {
            players,
            sessions,
            token_ttl_millis,
            starting_step,
        }
    }

    /// Create a new player account and open a session for it
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(Player, String), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Invalid("Name is required".to_string()));
        }

        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Invalid("Invalid email address".to_string()));
        }

        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Invalid(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        if self.players.email_exists(&email)? {
            return Err(AppError::Invalid("Email already registered".to_string()));
        }

        let username = self.unique_username(name)?;
        let salt = token::generate_salt();
        let player = self.players.create(&NewPlayer {
            username,
            name: name.to_string(),
            email,
            password_hash: hash_password(password, &salt),
            password_salt: salt,
            role: Role::Player,
            starting_step: self.starting_step,
        })?;

        let token = self.open_session(&player.username)?;
        Ok((player, token))
    }

    /// Verify credentials and open a session
    pub fn login(&self, email: &str, password: &str) -> Result<(Player, String), AppError> {
        let email = email.trim().to_lowercase();
        let player = self
            .players
            .find_by_email(&email)?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if hash_password(password, &player.password_salt) != player.password_hash {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.open_session(&player.username)?;
        Ok((player, token))
    }

    /// Resolve an `Authorization` header to the player behind it
    pub fn authenticate(&self, header: Option<&str>) -> Result<Player, AppError> {
        let header =
            header.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?
            .trim();

        let username = self
            .sessions
            .lookup(token)?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        self.players
            .get(&username)?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Drop the session behind a bearer token
    pub fn logout(&self, header: Option<&str>) -> Result<bool, AppError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        Ok(self.sessions.delete(token)?)
    }

    /// Create an admin account directly (CLI path, no session)
    pub fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Player, AppError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Invalid("Invalid email address".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Invalid(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if self.players.email_exists(&email)? {
            return Err(AppError::Invalid("Email already registered".to_string()));
        }

        let username = match username {
            Some(explicit) => {
                if self.players.username_exists(explicit)? {
                    return Err(AppError::Invalid("Username already taken".to_string()));
                }
                explicit.to_string()
            }
            None => self.unique_username(name)?,
        };

        let salt = token::generate_salt();
        let player = self.players.create(&NewPlayer {
            username,
            name: name.trim().to_string(),
            email,
            password_hash: hash_password(password, &salt),
            password_salt: salt,
            role: Role::Admin,
            starting_step: self.starting_step,
        })?;
        Ok(player)
    }

    fn open_session(&self, username: &str) -> Result<String, AppError> {
        let token = generate_session_token();
        self.sessions.insert(&token, username, self.token_ttl_millis)?;
        Ok(token)
    }

    /// Generate a username nobody holds yet
    fn unique_username(&self, name: &str) -> Result<String, AppError> {
        let base = generate_username(name);
        if !self.players.username_exists(&base)? {
            return Ok(base);
        }

        for _ in 0..USERNAME_RETRIES {
            let candidate = format!("{base}{}", token::random_u32() % 9999 + 1);
            if !self.players.username_exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "Could not find a free username for '{name}'"
        )))
    }
}

/// Salted SHA-256 digest, hex encoded
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::HuntDb;

    fn test_auth() -> AuthService {
        let db = HuntDb::open_in_memory().unwrap();
        AuthService::new(
            PlayerStore::new(db.clone()),
            SessionStore::new(db),
            60 * 60 * 1000,
            1,
        )
    }

    #[test]
    fn test_hash_is_stable_and_salted() {
        let a = hash_password("secret", "salt1");
        assert_eq!(a, hash_password("secret", "salt1"));
        assert_ne!(a, hash_password("secret", "salt2"));
        assert_ne!(a, hash_password("other", "salt1"));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("raj@example.com"));
        assert!(!is_valid_email("raj"));
        assert!(!is_valid_email("raj@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("raj@nodot"));
        assert!(!is_valid_email("raj @example.com"));
    }

    #[test]
    fn test_register_and_login() {
        let auth = test_auth();
        let (player, token) = auth.register("Carlos", "carlos@example.com", "smooth55").unwrap();
        assert_eq!(player.email, "carlos@example.com");
        assert_eq!(player.total_score, 0);
        assert!(!token.is_empty());

        let (again, _) = auth.login("carlos@example.com", "smooth55").unwrap();
        assert_eq!(again.username, player.username);

        let err = auth.login("carlos@example.com", "wrong").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let auth = test_auth();
        assert!(matches!(
            auth.register("", "a@b.com", "longenough"),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            auth.register("Raj", "not-an-email", "longenough"),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            auth.register("Raj", "raj@example.com", "short"),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let auth = test_auth();
        auth.register("Raj", "raj@example.com", "longenough").unwrap();
        let err = auth.register("Raj Two", "raj@example.com", "longenough").unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
    }

    #[test]
    fn test_special_name_collision_gets_suffix() {
        let auth = test_auth();
        let (first, _) = auth.register("Simran", "s1@example.com", "longenough").unwrap();
        assert_eq!(first.username, "jeejeegirl");

        let (second, _) = auth.register("Simran K", "s2@example.com", "longenough").unwrap();
        assert!(second.username.starts_with("jeejeegirl"));
        assert_ne!(second.username, "jeejeegirl");
    }

    #[test]
    fn test_authenticate_token_flow() {
        let auth = test_auth();
        let (player, token) = auth.register("Raj", "raj@example.com", "longenough").unwrap();

        let header = format!("Bearer {token}");
        let resolved = auth.authenticate(Some(&header)).unwrap();
        assert_eq!(resolved.username, player.username);

        assert!(matches!(
            auth.authenticate(None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate(Some("Bearer bogus")),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate(Some(&token)),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_logout_invalidates_token() {
        let auth = test_auth();
        let (_, token) = auth.register("Raj", "raj@example.com", "longenough").unwrap();
        let header = format!("Bearer {token}");

        assert!(auth.logout(Some(&header)).unwrap());
        assert!(matches!(
            auth.authenticate(Some(&header)),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_create_admin() {
        let auth = test_auth();
        let admin = auth
            .create_admin("The Boss", "boss@example.com", "longenough", Some("boss"))
            .unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.username, "boss");

        let err = auth
            .create_admin("Other", "other@example.com", "longenough", Some("boss"))
            .unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
    }
}

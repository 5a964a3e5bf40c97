//! Login lookup and password verification.
//!
//! Stored passwords are either legacy plaintext or an encoded PBKDF2
//! hash of the form `pbkdf2-sha256$<iterations>$<salt-hex>$<hash-hex>`.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{EmployeeId, Role, User};
use crate::storage::{Collection, Storage};

const HASH_SCHEME: &str = "pbkdf2-sha256";
const HASH_PREFIX: &str = "pbkdf2-sha256$";
const DEFAULT_ITERATIONS: u32 = 200_000;
const HASH_LEN: usize = 32;
const SALT_LEN: usize = 16;

/// The identity a presentation layer keeps after a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub employee_id: Option<EmployeeId>,
}

impl Session {
    /// Fails with `PermissionDenied` unless the session has `role`.
    pub fn require(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::PermissionDenied(role))
        }
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Session {
            username: user.username.clone(),
            role: user.role,
            employee_id: user.employee_id.clone(),
        }
    }
}

pub fn load_users(store: &impl Storage) -> Result<Vec<User>> {
    store.load(Collection::Users)
}

/// Returns the user whose username matches exactly and whose stored
/// password verifies, or `None`.
pub fn authenticate(store: &impl Storage, username: &str, password: &str) -> Result<Option<User>> {
    let users = load_users(store)?;
    let user = users
        .into_iter()
        .find(|u| u.username == username && verify_password(&u.password, password));
    match &user {
        Some(u) => debug!(username = %u.username, role = %u.role, "login accepted"),
        None => warn!("login rejected"),
    }
    Ok(user)
}

/// Authenticates and turns the result into a [`Session`].
pub fn login(store: &impl Storage, username: &str, password: &str) -> Result<Session> {
    authenticate(store, username, password)?
        .as_ref()
        .map(Session::from)
        .ok_or(Error::InvalidCredentials)
}

/// Hashes a password with a fresh random 16-byte salt from the OS.
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_iterations(password, DEFAULT_ITERATIONS)
}

/// Like [`hash_password`] with an explicit PBKDF2 iteration count.
pub fn hash_password_with_iterations(password: &str, iterations: u32) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt)?;
    Ok(hash_with(password, &salt, iterations.max(1)))
}

fn hash_with(password: &str, salt: &[u8], iterations: u32) -> String {
    format!(
        "{}{}${}${}",
        HASH_PREFIX,
        iterations,
        hex::encode(salt),
        hex::encode(derive_key(password, salt, iterations))
    )
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Checks a supplied password against a stored one.
///
/// Values without the hash prefix are compared as plaintext. A stored
/// hash that cannot be decoded never verifies.
pub fn verify_password(stored: &str, supplied: &str) -> bool {
    if !stored.starts_with(HASH_PREFIX) {
        return stored == supplied;
    }
    match verify_hash(stored, supplied) {
        Ok(ok) => ok,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

fn verify_hash(stored: &str, supplied: &str) -> Result<bool> {
    let mut parts = stored.split('$');
    let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(Error::MalformedPasswordHash);
    };
    let iterations: u32 = iterations.parse().map_err(|_| Error::MalformedPasswordHash)?;
    let salt = hex::decode(salt).map_err(|_| Error::MalformedPasswordHash)?;
    let expected = hex::decode(expected).map_err(|_| Error::MalformedPasswordHash)?;
    if iterations == 0 || expected.len() != HASH_LEN {
        return Err(Error::MalformedPasswordHash);
    }
    Ok(derive_key(supplied, &salt, iterations)[..] == expected[..])
}

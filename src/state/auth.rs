use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, io};

pub const TOKEN_ENV: &str = "COURTSIDE_TOKEN";

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Expiry timestamp (seconds since the epoch) from a JWT, without checking
/// the signature. The backend owns the key; the client only needs `exp`.
pub fn token_expiry(token: &str) -> Option<i64> {
    let header = decode_header(token).ok()?;
    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims.exp),
        Err(e) => {
            debug!("could not decode token: {e}");
            None
        }
    }
}

/// Undecodable tokens count as expired.
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now().timestamp())
}

fn is_token_expired_at(token: &str, now: i64) -> bool {
    token_expiry(token).is_none_or(|exp| exp <= now)
}

/// Where the session token lives between runs.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/courtside/token`, falling back to `~/.config/courtside/token`.
    pub fn default_location() -> Self {
        Self::new(config_dir().join("token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token from the environment first, then the token file. Expired tokens
    /// are ignored.
    pub fn load(&self) -> Option<String> {
        let from_env = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());
        let token = from_env.or_else(|| {
            fs::read_to_string(&self.path)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })?;

        if is_token_expired(&token) {
            warn!("stored session token has expired");
            return None;
        }
        Some(token)
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("courtside");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("courtside");
    }
    PathBuf::from(".courtside")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        aud: &'a str,
    }

    fn token(exp: i64) -> String {
        let claims = TestClaims { sub: "admin", exp, aud: "stats" };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn reads_exp_without_the_signing_key() {
        assert_eq!(token_expiry(&token(1_900_000_000)), Some(1_900_000_000));
    }

    #[test]
    fn expiry_is_compared_against_now() {
        let t = token(1_000);
        assert!(is_token_expired_at(&t, 1_000));
        assert!(is_token_expired_at(&t, 2_000));
        assert!(!is_token_expired_at(&t, 999));
    }

    #[test]
    fn garbage_counts_as_expired() {
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired(""));
    }

    #[test]
    fn store_round_trips_and_clears() {
        let dir = std::env::temp_dir().join(format!("courtside-auth-{}", std::process::id()));
        let store = TokenStore::new(dir.join("nested").join("token"));
        let fresh = token(Utc::now().timestamp() + 3600);

        store.save(&fresh).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), fresh);

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine.
        store.clear().unwrap();
        let _ = fs::remove_dir_all(dir);
    }
}

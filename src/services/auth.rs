use crate::utils::sha256_hex;

pub const SESSION_COOKIE: &str = "admin_session";
const SESSION_MARKER: &str = "authenticated";
const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// The single administrator credential pair. The password is held as a
/// sha256 hex digest, never plaintext. There is deliberately no multi-user
/// account model here.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password_sha256: String,
}

pub struct Authenticator {
    credentials: Credentials,
    secure_cookies: bool,
}

impl Authenticator {
    pub fn new(credentials: Credentials, secure_cookies: bool) -> Self {
        Authenticator {
            credentials,
            secure_cookies,
        }
    }

    /// Compares against the configured pair. Callers get a bare bool; which
    /// half mismatched is never revealed.
    pub fn login(&self, username: &str, password: &str) -> bool {
        username == self.credentials.username
            && sha256_hex(password) == self.credentials.password_sha256
    }

    /// True iff the session cookie is present and exactly equals the
    /// authenticated marker. Expiry is enforced by the cookie's own
    /// Max-Age, not re-checked here.
    pub fn check(&self, cookie_header: Option<&str>) -> bool {
        cookie_value(cookie_header, SESSION_COOKIE)
            .map(|value| value == SESSION_MARKER)
            .unwrap_or(false)
    }

    pub fn session_cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            SESSION_COOKIE,
            SESSION_MARKER,
            SESSION_MAX_AGE_SECS,
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }

    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            SESSION_COOKIE,
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }
}

fn cookie_value<'a>(header: Option<&'a str>, name: &str) -> Option<&'a str> {
    header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

//! Cookie transport for credentials.

use std::time::Duration;

/// Cookie carrying an ordinary session credential.
pub const USER_COOKIE: &str = "token";

/// Cookie carrying an administrator credential.
pub const ADMIN_COOKIE: &str = "adminToken";

const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Cross-site frontends need `None`; browsers then require `Secure`.
const SAME_SITE: &str = "None";

/// Which session a cookie belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieScope {
    User,
    Admin,
    Both,
}

impl CookieScope {
    fn cookie_names(self) -> &'static [&'static str] {
        match self {
            CookieScope::User => &[USER_COOKIE],
            CookieScope::Admin => &[ADMIN_COOKIE],
            CookieScope::Both => &[ADMIN_COOKIE, USER_COOKIE],
        }
    }
}

/// A `Set-Cookie` instruction.
///
/// Credential cookies are always `HttpOnly; SameSite=None; Secure`; the
/// frontend is served from a different origin than the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: &'static str,
    pub value: String,
    pub max_age: Duration,
    expired: bool,
}

impl CookieSpec {
    pub fn session(name: &'static str, value: impl Into<String>, max_age: Duration) -> Self {
        Self {
            name,
            value: value.into(),
            max_age,
            expired: false,
        }
    }

    /// Overwrite `name` with an empty, already-expired value.
    pub fn expired(name: &'static str) -> Self {
        Self {
            name,
            value: String::new(),
            max_age: Duration::ZERO,
            expired: true,
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite={SAME_SITE}; Secure; Max-Age={}",
            self.name,
            self.value,
            self.max_age.as_secs()
        );
        if self.expired {
            cookie.push_str("; Expires=");
            cookie.push_str(EPOCH_EXPIRES);
        }
        cookie
    }
}

impl std::fmt::Display for CookieSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.header_value())
    }
}

/// End a session by expiring the cookies for `scope`.
///
/// Tokens are self-contained: this only clears client transport state. A
/// copy of an unexpired credential replayed from elsewhere stays valid until
/// its `exp`.
pub fn terminate(scope: CookieScope) -> Vec<CookieSpec> {
    scope
        .cookie_names()
        .iter()
        .map(|&name| CookieSpec::expired(name))
        .collect()
}

/// Find a cookie's value in a `Cookie` request header. Empty values count
/// as absent.
pub fn cookie_from_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let value = value.trim();
        (name.trim() == cookie_name && !value.is_empty()).then_some(value)
    })
}

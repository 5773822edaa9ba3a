//! Signed session cookie.
//!
//! The cookie carries `<session id>.<hex hmac-sha256(session id)>`; a value
//! whose signature does not match the server secret is ignored.

use axum::http::{HeaderMap, HeaderValue, header};
use career_core::model::{SESSION_TTL_HOURS, SessionId};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const COOKIE_NAME: &str = "career.sid";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionCookie {
    secret: Vec<u8>,
    secure: bool,
}

impl SessionCookie {
    #[must_use]
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            secure,
        }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).ok()
    }

    fn sign(&self, id: &SessionId) -> Option<String> {
        let mut mac = self.mac()?;
        mac.update(id.as_str().as_bytes());
        Some(format!(
            "{}.{}",
            id.as_str(),
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac()?;
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(SessionId::new(id))
    }

    /// Session id from the request's `Cookie` header, if present and
    /// correctly signed.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, value)| self.verify(value))
    }

    /// `Set-Cookie` value that installs the session.
    #[must_use]
    pub fn set(&self, id: &SessionId) -> Option<HeaderValue> {
        let value = self.sign(id)?;
        let max_age = SESSION_TTL_HOURS * 3600;
        let mut cookie =
            format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }

    /// `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(&self) -> HeaderValue {
        HeaderValue::from_static("career.sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn cookie_pair(set_cookie: &HeaderValue) -> String {
        set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn signed_cookie_round_trips_among_other_cookies() {
        let cookies = SessionCookie::new("secret", false);
        let id = SessionId::new("abc123");
        let pair = cookie_pair(&cookies.set(&id).unwrap());
        let headers = headers_with(&format!("theme=dark; {pair}"));
        assert_eq!(cookies.read(&headers), Some(id));
    }

    #[test]
    fn tampered_or_foreign_cookies_are_ignored() {
        let cookies = SessionCookie::new("secret", false);
        let pair = cookie_pair(&cookies.set(&SessionId::new("abc123")).unwrap());

        let tampered = pair.replace("abc123", "abc124");
        assert_eq!(cookies.read(&headers_with(&tampered)), None);

        let other = SessionCookie::new("other-secret", false);
        assert_eq!(other.read(&headers_with(&pair)), None);

        assert_eq!(cookies.read(&headers_with("career.sid=garbage")), None);
    }

    #[test]
    fn secure_flag_follows_config() {
        let id = SessionId::new("abc");
        let secure = SessionCookie::new("s", true).set(&id).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
        let plain = SessionCookie::new("s", false).set(&id).unwrap();
        assert!(!plain.to_str().unwrap().contains("Secure"));
        assert!(plain.to_str().unwrap().contains("Max-Age=86400"));
    }
}

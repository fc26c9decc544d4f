use log::{debug, warn};
use reqwest::header::{HeaderMap, SET_COOKIE};

/// Appliance login credentials. Immutable for the lifetime of one run.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }
}

/// Holds the session cookie handed out by the appliance after login.
///
/// At most one cookie value is held at a time. A response carrying a
/// `Set-Cookie` header overwrites it; a response without one leaves the
/// previous value in place so it keeps riding along on later requests.
#[derive(Debug, Default)]
pub struct SessionState {
    cookie: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState { cookie: None }
    }

    pub fn get(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Scan response headers for `Set-Cookie` and capture everything before
    /// the first `;` (the attributes after it are not ours to replay).
    pub fn update(&mut self, headers: &HeaderMap) {
        let Some(raw) = headers.get(SET_COOKIE) else {
            return;
        };
        let value = match raw.to_str() {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring undecodable Set-Cookie header: {err}");
                return;
            }
        };
        let cookie = match value.find(';') {
            Some(index) => &value[..index],
            None => value,
        };
        debug!("captured session cookie [{cookie}]");
        self.cookie = Some(cookie.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with_set_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn captures_cookie_up_to_first_semicolon() {
        let mut session = SessionState::new();
        session.update(&headers_with_set_cookie("SESSIONID=abc123; Path=/"));
        assert_eq!(session.get(), Some("SESSIONID=abc123"));
    }

    #[test]
    fn captures_bare_cookie_without_attributes() {
        let mut session = SessionState::new();
        session.update(&headers_with_set_cookie("sid=xyz"));
        assert_eq!(session.get(), Some("sid=xyz"));
    }

    #[test]
    fn keeps_cookie_when_response_sets_none() {
        let mut session = SessionState::new();
        session.update(&headers_with_set_cookie("sid=xyz; HttpOnly"));
        session.update(&HeaderMap::new());
        assert_eq!(session.get(), Some("sid=xyz"));
    }

    #[test]
    fn last_cookie_wins() {
        let mut session = SessionState::new();
        session.update(&headers_with_set_cookie("sid=first;"));
        session.update(&headers_with_set_cookie("sid=second;"));
        assert_eq!(session.get(), Some("sid=second"));
    }
}

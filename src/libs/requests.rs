use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_CHARSET, CONTENT_TYPE, COOKIE, PRAGMA, USER_AGENT};
use thiserror::Error;

use crate::libs::session::SessionState;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid appliance URL [{0}]")]
    Construction(String),
    #[error("error when sending message to appliance [{0}]")]
    Dispatch(String),
    #[error("failed to authenticate [{0}]")]
    AuthFailed(String),
    #[error("unable to find expected {0} field in record")]
    MissingField(String),
}

/// Header set the appliance expects on every request. The duplicate
/// content-type write mirrors the appliance's own client: the form-urlencoded
/// value is the one that ends up on the wire.
fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/xml"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("xml/txt"));
    headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("iso-8859-1,*,utf-8"));
    headers.insert(USER_AGENT, HeaderValue::from_static("CIDS Client/4.0"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
    headers
}

/// Build one outbound request. A non-empty body selects POST, otherwise GET.
/// The held session cookie, if any, rides along. No network I/O happens here.
pub fn build_request(client: &Client, url: &str, body: &str, cookie: Option<&str>) -> RequestBuilder {
    let mut request = if body.is_empty() {
        client.get(url)
    } else {
        client.post(url).body(body.to_owned())
    };
    request = request.headers(fixed_headers());
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    request
}

/// Send one request and return the response body text.
///
/// Response headers feed `SessionState::update` before the status is checked,
/// so a cookie handed out on a failing response is still captured. The body is
/// read line by line and joined with no separator, matching how the appliance's
/// own client reassembles it.
pub fn dispatch(
    client: &Client,
    session: &mut SessionState,
    url: &str,
    body: &str,
) -> Result<String, ClientError> {
    debug!("request URI [{url}]");
    if let Some(cookie) = session.get() {
        debug!("   key [Cookie] value [{cookie}]");
    }

    let request = build_request(client, url, body, session.get());
    let response = request.send().map_err(|err| ClientError::Dispatch(err.to_string()))?;

    session.update(response.headers());
    for (key, value) in response.headers() {
        debug!("   key [{key}] value [{value:?}]");
    }

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Dispatch(format!("appliance returned status {status}")));
    }

    let text = response.text().map_err(|err| ClientError::Dispatch(err.to_string()))?;
    let joined: String = text.lines().collect();
    debug!("response [{joined}]");
    Ok(joined)
}

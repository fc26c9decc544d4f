use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;

use crate::libs::arguments::EunType;
use crate::libs::requests::{dispatch, ClientError};
use crate::libs::session::{Credentials, SessionState};
use crate::libs::transport::build_client;

const LOGIN_SEGMENT: &str = "/authentication/login/";

/// One EUN record as the appliance stores it: an opaque JSON blob that is
/// guaranteed to carry a `message` field with the detail text.
#[derive(Debug)]
pub struct EunRecord {
    value: Value,
}

impl EunRecord {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        if value.get("message").and_then(Value::as_str).is_none() {
            return Err(ClientError::MissingField("message".to_owned()));
        }
        Ok(EunRecord { value })
    }

    pub fn message(&self) -> &str {
        self.value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Patch the detail text in place. The rest of the blob (caption, type,
    /// image binary and so on) is carried along untouched so an eventual
    /// write-back resends the record whole.
    pub fn set_message(&mut self, message: &str) {
        self.value["message"] = Value::String(message.to_owned());
    }
}

/// Drives the two-step protocol against one appliance: authenticate, then
/// retrieve. The session cookie captured during login is replayed on every
/// later request by the dispatcher.
#[derive(Debug)]
pub struct AuthenticatedClient {
    client: Client,
    base: String,
    credentials: Credentials,
    session: SessionState,
}

impl AuthenticatedClient {
    /// Validates the base URL and builds the transport. `insecure` trusts any
    /// certificate and hostname, the normal mode for self-signed appliances.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        insecure: bool,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| ClientError::Construction(format!("{base_url}: {err}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::Construction(format!(
                "{base_url}: scheme must be http or https"
            )));
        }

        Ok(AuthenticatedClient {
            client: build_client(insecure, timeout),
            base: base_url.trim_end_matches('/').to_owned(),
            credentials,
            session: SessionState::new(),
        })
    }

    /// POST the login form. A non-erroring round trip counts as success; the
    /// appliance signals a usable session only through the cookie it sets, not
    /// through the response body.
    pub fn login(&mut self) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base, LOGIN_SEGMENT);
        let username = utf8_percent_encode(&self.credentials.username, NON_ALPHANUMERIC);
        let password = utf8_percent_encode(&self.credentials.password, NON_ALPHANUMERIC);
        let body = format!("username={username}&password={password}&next=\"\"");

        dispatch(&self.client, &mut self.session, &url, &body)
            .map_err(|err| ClientError::AuthFailed(err.to_string()))?;
        Ok(())
    }

    /// GET the record for one EUN category and decode it.
    pub fn fetch_record(&mut self, eun_type: EunType) -> Result<EunRecord, ClientError> {
        let url = format!("{}{}", self.base, eun_type.path_segment());
        let body = dispatch(&self.client, &mut self.session, &url, "")?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| ClientError::Dispatch(format!("record is not valid JSON: {err}")))?;
        EunRecord::from_value(value)
    }
}

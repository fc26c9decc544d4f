use std::time::Duration;

use log::warn;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;

/// Build the blocking HTTP client used for every request in a run.
///
/// With `insecure` set the client trusts any certificate chain and any
/// hostname. The appliances this tool talks to ship self-signed certs, so
/// that is the normal operating mode; callers opt in explicitly rather than
/// flipping any process-wide default.
///
/// Redirects are never followed and responses are never cached; an eventual
/// redirect is surfaced to the dispatcher as-is.
pub fn build_client(insecure: bool, timeout: Duration) -> Client {
    let mut builder = Client::builder()
        .redirect(Policy::none())
        .timeout(timeout);

    if insecure {
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    match builder.build() {
        Ok(client) => client,
        Err(err) => {
            // Fall back to default TLS behavior instead of aborting, the
            // connection itself may still fail later and report normally.
            warn!("unable to configure transport ({err}), using default client");
            Client::new()
        }
    }
}

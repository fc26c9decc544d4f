pub mod libs {
    pub mod arguments;
    pub mod client;
    pub mod requests;
    pub mod session;
    pub mod transport;
}

use std::fs;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Error, Result};
use clap::Parser;

use libs::arguments::{Args, EunType};
use libs::client::AuthenticatedClient;
use libs::session::Credentials;

/// Workaround for CSCut17139: the appliance UI mangles the EUN detail text,
/// so the whole record is fetched over the API and the text patched locally.
/// The write-back POST is a planned follow-up, for now the patched record is
/// only printed.
fn process(args: Args) -> Result<()> {
    let eun_type = EunType::from_prefix(&args.eun_type);
    let credentials = Credentials::new(&args.username, &args.password);
    let mut client = AuthenticatedClient::new(
        &args.url,
        credentials,
        !args.verify_tls,
        Duration::from_secs(args.timeout),
    )?;

    println!("Attempting login as: {}", args.username);
    client.login()?;
    println!("[+] Logged in");

    let mut record = client.fetch_record(eun_type)?;
    println!("[+] Message found for {eun_type}:");
    println!("{}", record.message());

    let Some(path) = args.message_file else {
        println!("[*] No message file specified, record retrieved only");
        return Ok(());
    };

    let new_message =
        fs::read_to_string(&path).with_context(|| format!("unable to read {path}"))?;
    if new_message.is_empty() {
        return Err(Error::msg(format!("update file {path} was empty")));
    }

    record.set_message(&new_message);
    println!("[+] New message:");
    println!("{}", record.message());
    println!("[*] Write-back is not implemented yet, the record was patched in memory only");

    Ok(())
}

pub fn eun_run() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = process(args) {
        eprintln!("[-] {err:#}");
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_args(server: &MockServer) -> Args {
        Args {
            url: server.base_url(),
            eun_type: "Warning".to_string(),
            username: "cisco".to_string(),
            password: "secret".to_string(),
            message_file: None,
            verbose: false,
            verify_tls: true,
            timeout: 5,
        }
    }

    #[test]
    fn failed_login_short_circuits_the_fetch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/authentication/login/");
            then.status(403);
        });
        let fetch = server.mock(|when, then| {
            when.method(GET)
                .path("/api/configure/customeun/CustomEUN/geteunbytype/64/2.json/");
            then.status(200).json_body(json!({"message": "hello"}));
        });

        assert!(process(test_args(&server)).is_err());
        fetch.assert_hits(0);
    }

    #[test]
    fn retrieve_and_patch_from_message_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/authentication/login/");
            then.status(200).header("Set-Cookie", "sid=abc;");
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/configure/customeun/CustomEUN/geteunbytype/64/2.json/")
                .header("cookie", "sid=abc");
            then.status(200).json_body(json!({"message": "hello"}));
        });

        let path = std::env::temp_dir().join("eun_update_patch_test.txt");
        fs::write(&path, "replacement text").unwrap();

        let mut args = test_args(&server);
        args.message_file = Some(path.to_string_lossy().into_owned());
        process(args).unwrap();
    }

    #[test]
    fn empty_message_file_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/authentication/login/");
            then.status(200).header("Set-Cookie", "sid=abc;");
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/configure/customeun/CustomEUN/geteunbytype/64/2.json/");
            then.status(200).json_body(json!({"message": "hello"}));
        });

        let path = std::env::temp_dir().join("eun_update_empty_test.txt");
        fs::write(&path, "").unwrap();

        let mut args = test_args(&server);
        args.message_file = Some(path.to_string_lossy().into_owned());
        assert!(process(args).is_err());
    }
}

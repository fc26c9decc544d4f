use anyhow::{Error, Result};
use clap::Parser;
use regex::Regex;
use serde::Serialize;

/// The EUN page categories the appliance knows about, each with its fixed
/// retrieval path. The numeric parts of the segments are the appliance's
/// internal type and template ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EunType {
    WebReputation,
    FileType,
    UrlFiltering,
    Application,
    Destination,
    Warning,
    Authentication,
}

const CATALOG: [(&str, EunType); 7] = [
    ("webreputation", EunType::WebReputation),
    ("filetype", EunType::FileType),
    ("urlfiltering", EunType::UrlFiltering),
    ("application", EunType::Application),
    ("destination", EunType::Destination),
    ("warning", EunType::Warning),
    ("authentication", EunType::Authentication),
];

impl EunType {
    pub fn path_segment(&self) -> &'static str {
        match self {
            EunType::WebReputation => "/api/configure/customeun/CustomEUN/geteunbytype/1/1.json/",
            EunType::FileType => "/api/configure/customeun/CustomEUN/geteunbytype/2/1.json/",
            EunType::UrlFiltering => "/api/configure/customeun/CustomEUN/geteunbytype/4/1.json/",
            EunType::Application => "/api/configure/customeun/CustomEUN/geteunbytype/8/1.json/",
            EunType::Destination => "/api/configure/customeun/CustomEUN/geteunbytype/16/1.json/",
            EunType::Warning => "/api/configure/customeun/CustomEUN/geteunbytype/64/2.json/",
            EunType::Authentication => "/api/configure/customeun/CustomEUN/geteunbytype/128/3.json/",
        }
    }

    /// Case-insensitive prefix lookup. Empty, unrecognized or ambiguous input
    /// falls back to `Application`.
    pub fn from_prefix(input: &str) -> EunType {
        if input.is_empty() {
            return EunType::Application;
        }
        let lower = input.to_lowercase();
        let mut resolved = None;
        for (name, eun_type) in CATALOG {
            if name.starts_with(&lower) {
                if resolved.is_some() {
                    return EunType::Application;
                }
                resolved = Some(eun_type);
            }
        }
        resolved.unwrap_or(EunType::Application)
    }
}

impl std::fmt::Display for EunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EunType::WebReputation => "WebReputation",
            EunType::FileType => "FileType",
            EunType::UrlFiltering => "UrlFiltering",
            EunType::Application => "Application",
            EunType::Destination => "Destination",
            EunType::Warning => "Warning",
            EunType::Authentication => "Authentication",
        };
        write!(f, "{name}")
    }
}

fn validate_base_url(url: &str) -> Result<String> {
    let scheme = Regex::new(r"^https?://[^\s/]+")?;
    if scheme.is_match(url) {
        Ok(url.to_string())
    } else {
        Err(Error::msg(
            "must be in format https://192.168.1.1 or http://sensor.example.com:8443",
        ))
    }
}

/// Retrieves an End User Notification record from a Cisco CX sensor and
/// optionally patches its detail text. Certificate verification is disabled
/// by default because these appliances ship self-signed certificates.
#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Appliance base URL (format https://192.168.1.1)
    #[arg(value_parser = validate_base_url)]
    pub url: String,

    /// EUN page category: WebReputation, FileType, UrlFiltering, Application,
    /// Destination, Warning or Authentication; matched by prefix, anything
    /// else falls back to Application
    #[arg(default_value = "Application")]
    pub eun_type: String,

    /// Appliance username
    #[arg(short, long)]
    pub username: String,

    /// Appliance password
    #[arg(short, long)]
    pub password: String,

    /// File holding the replacement detail text [default: retrieve only]
    #[arg(short, long)]
    pub message_file: Option<String>,

    /// Print request and response diagnostics
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Verify the appliance TLS certificate instead of trusting any cert
    #[arg(long, default_value_t = false)]
    pub verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,
}

#[test]
fn validate_base_url_test() {
    let test_cases = [
        ("https://10.0.0.1", true),
        ("https://10.0.0.1:8443", true),
        ("http://sensor.example.com", true),
        ("10.0.0.1", false),
        ("ssh://10.0.0.1", false),
        ("https://", false),
    ];

    for case in test_cases {
        let result = validate_base_url(case.0);
        if case.1 {
            assert!(result.is_ok());
        } else {
            assert!(result.is_err());
        }
    }
}

#[test]
fn eun_type_prefix_lookup_test() {
    let test_cases = [
        ("Warning", EunType::Warning),
        ("warn", EunType::Warning),
        ("WEB", EunType::WebReputation),
        ("urlfiltering", EunType::UrlFiltering),
        // empty and unknown fall back to the default
        ("", EunType::Application),
        ("bogus", EunType::Application),
        // "a" matches both application and authentication
        ("a", EunType::Application),
    ];

    for case in test_cases {
        assert_eq!(EunType::from_prefix(case.0), case.1);
    }
}

#[test]
fn warning_segment_test() {
    assert_eq!(
        EunType::Warning.path_segment(),
        "/api/configure/customeun/CustomEUN/geteunbytype/64/2.json/"
    );
    assert_eq!(
        EunType::from_prefix("").path_segment(),
        "/api/configure/customeun/CustomEUN/geteunbytype/8/1.json/"
    );
}

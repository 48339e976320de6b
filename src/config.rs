//! Immutable per-process proxy configuration.
//!
//! [`ProxyConfig`] is resolved once at startup from CLI flags and their
//! environment variable equivalents, validated, and then shared read-only
//! across concurrent request handlers. There are no mutable globals and no
//! reload path: the source of truth is the process environment, which
//! cannot change mid-run.

use url::Url;

use crate::cli::RunArgs;
use crate::error::{TagRelayError, ValidationError};

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// CORS allow-list, matched against the `Origin` header by exact string
    /// comparison. No wildcards, no subdomain matching.
    pub allowed_origins: Vec<String>,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub force_region: bool,
    pub script_origin: String,
    pub collect_origin: String,
    pub region_origin: String,
}

impl ProxyConfig {
    pub fn from_run_args(args: &RunArgs) -> Result<Self, TagRelayError> {
        let config = Self {
            allowed_origins: parse_origin_list(&args.allow_origins),
            cookie_name: args.cookie_name.trim().to_string(),
            cookie_domain: args
                .cookie_domain
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            force_region: args.force_region,
            script_origin: normalize_origin(&args.script_origin),
            collect_origin: normalize_origin(&args.collect_origin),
            region_origin: normalize_origin(&args.region_origin),
        };

        if let Err(errors) = validate(&config) {
            return Err(TagRelayError::ConfigValidation { errors });
        }
        Ok(config)
    }

    /// Base origin for browser collect hits. The region-restricted origin
    /// keeps traffic inside a specific processing region when forced.
    #[must_use]
    pub fn collect_base(&self) -> &str {
        if self.force_region {
            &self.region_origin
        } else {
            &self.collect_origin
        }
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trim whitespace and any trailing slash so origins compare and join cleanly.
fn normalize_origin(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Validate a single origin string. Returns `Ok(())` or a human-readable error.
pub fn validate_origin(origin: &str) -> Result<(), String> {
    if origin.ends_with('/') {
        return Err(format!(
            "origin must not end with '/' (did you mean '{}'?)",
            origin.trim_end_matches('/')
        ));
    }
    match Url::parse(origin) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                return Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ));
            }
            if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
                return Err("origin must be scheme://host[:port] with no path".into());
            }
            Ok(())
        }
        Err(_) => Err(format!(
            "'{origin}' is not a valid origin (did you mean 'https://{origin}'?)"
        )),
    }
}

/// Validate a cookie name against the RFC 6265 token grammar.
pub fn validate_cookie_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("cookie name cannot be empty".into());
    }
    let is_token_char = |c: char| {
        c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
    };
    if name.chars().all(is_token_char) {
        Ok(())
    } else {
        Err(format!("'{name}' contains characters not allowed in a cookie name"))
    }
}

pub fn validate(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for origin in &config.allowed_origins {
        if let Err(msg) = validate_origin(origin) {
            errors.push(ValidationError {
                field: "allow-origins".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    if let Err(msg) = validate_cookie_name(&config.cookie_name) {
        errors.push(ValidationError {
            field: "cookie-name".into(),
            message: msg,
            suggestion: Some("use alphanumerics, '-' or '_'".into()),
        });
    }

    if let Some(ref domain) = config.cookie_domain {
        if domain.contains(';') || domain.contains(char::is_whitespace) {
            errors.push(ValidationError {
                field: "cookie-domain".into(),
                message: format!("'{domain}' is not a valid cookie domain"),
                suggestion: None,
            });
        }
    }

    for (field, origin) in [
        ("script-origin", &config.script_origin),
        ("collect-origin", &config.collect_origin),
        ("region-origin", &config.region_origin),
    ] {
        if let Err(msg) = validate_origin(origin) {
            errors.push(ValidationError {
                field: field.into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> ProxyConfig {
        ProxyConfig {
            allowed_origins: vec!["https://example.com".into()],
            cookie_name: "fpid".into(),
            cookie_domain: None,
            force_region: false,
            script_origin: "https://www.googletagmanager.com".into(),
            collect_origin: "https://www.google-analytics.com".into(),
            region_origin: "https://region1.google-analytics.com".into(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn origin_list_splits_and_trims() {
        let origins = parse_origin_list(" https://a.com, https://b.com ,,https://c.com");
        assert_eq!(origins, ["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn empty_origin_list_is_empty() {
        assert!(parse_origin_list("").is_empty());
        assert!(parse_origin_list(" , ").is_empty());
    }

    #[test]
    fn origin_with_path_fails() {
        let mut config = minimal_config();
        config.allowed_origins = vec!["https://example.com/app".into()];
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("no path"));
    }

    #[test]
    fn origin_without_scheme_fails() {
        let mut config = minimal_config();
        config.allowed_origins = vec!["example.com".into()];
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("did you mean 'https://example.com'?"));
    }

    #[test]
    fn trailing_slash_origin_fails() {
        let mut config = minimal_config();
        config.allowed_origins = vec!["https://example.com/".into()];
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("must not end with '/'"));
    }

    #[test]
    fn bad_cookie_name_fails() {
        let mut config = minimal_config();
        config.cookie_name = "fp id".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "cookie-name");
    }

    #[test]
    fn bad_upstream_origin_fails() {
        let mut config = minimal_config();
        config.region_origin = "ftp://region1.example".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "region-origin"));
    }

    #[test]
    fn collect_base_honors_region_flag() {
        let mut config = minimal_config();
        assert_eq!(config.collect_base(), "https://www.google-analytics.com");
        config.force_region = true;
        assert_eq!(config.collect_base(), "https://region1.google-analytics.com");
    }

    #[test]
    fn normalize_origin_strips_trailing_slash() {
        assert_eq!(normalize_origin("https://a.com/ "), "https://a.com");
    }
}

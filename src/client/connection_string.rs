//! JDBC-style connection URI parsing
//!
//! Supports the format:
//! * `jdbc:couchbase:host1,host2` (no options)
//! * `jdbc:couchbase:host1,host2?foo=bar&sslenabled=true`
//!
//! Reserved option keys (`username`, `password`, `sslenabled`,
//! `verifyservercertificate`) are consumed during parsing and never
//! forwarded to the cluster client; all other keys pass through verbatim
//! into the normalized connection string.

use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Required prefix for every accepted URI.
pub const URI_PREFIX: &str = "jdbc:couchbase:";

/// Scheme prepended to the connection string for plaintext connections.
pub const PLAIN_SCHEME: &str = "couchbase://";

/// Scheme prepended to the connection string when TLS is enabled.
pub const SECURE_SCHEME: &str = "couchbases://";

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const SSL_ENABLED: &str = "sslenabled";
const VERIFY_SERVER_CERTIFICATE: &str = "verifyservercertificate";

const SSL_ENABLED_DEFAULT: &str = "false";
const VERIFY_SERVER_CERTIFICATE_DEFAULT: &str = "true";

/// Option keys consumed for credential/TLS resolution, excluded from the
/// normalized connection string.
const RESERVED_KEYS: [&str; 4] = [USERNAME, PASSWORD, SSL_ENABLED, VERIFY_SERVER_CERTIFICATE];

/// Query options keyed by lowercased name. Values keep encounter order;
/// only the last value of a key is authoritative.
type OptionMap = BTreeMap<String, Vec<String>>;

/// A parsed `jdbc:couchbase:` URI.
///
/// Immutable once constructed. Holds the raw URI, the host segment, the
/// resolved credentials and TLS flags, and the normalized connection
/// string handed to the cluster client.
#[derive(Debug, Clone)]
pub struct ClientUri {
    uri: String,
    hosts: String,
    options: Option<OptionMap>,
    username: Option<String>,
    password: Option<String>,
    ssl_enabled: bool,
    verify_server_cert: bool,
    connection_string: String,
}

impl ClientUri {
    /// Parse a JDBC-style URI, optionally consulting an external property
    /// bag for the four reserved settings.
    ///
    /// Precedence for `username`, `password`, `sslenabled`, and
    /// `verifyservercertificate`: a value present in `overrides` wins
    /// outright (even an empty string), otherwise the last occurrence in
    /// the URI query string wins, otherwise the documented default applies
    /// (TLS off, certificate verification on).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedUri`] when `uri` does not start with
    /// [`URI_PREFIX`].
    pub fn parse(uri: &str, overrides: Option<&HashMap<String, String>>) -> Result<Self> {
        let trimmed = uri
            .strip_prefix(URI_PREFIX)
            .ok_or_else(|| Error::MalformedUri(format!("URI needs to start with {URI_PREFIX}")))?;

        let (hosts, options) = match trimmed.find('?') {
            None => (trimmed, None),
            Some(idx) => (&trimmed[..idx], Some(parse_options(&trimmed[idx + 1..]))),
        };

        let username = resolve_option(overrides, options.as_ref(), USERNAME);
        let password = resolve_option(overrides, options.as_ref(), PASSWORD);
        let ssl_enabled = is_true(
            resolve_option(overrides, options.as_ref(), SSL_ENABLED)
                .as_deref()
                .unwrap_or(SSL_ENABLED_DEFAULT),
        );
        let verify_server_cert = is_true(
            resolve_option(overrides, options.as_ref(), VERIFY_SERVER_CERTIFICATE)
                .as_deref()
                .unwrap_or(VERIFY_SERVER_CERTIFICATE_DEFAULT),
        );
        let connection_string = build_connection_string(hosts, options.as_ref());

        Ok(Self {
            uri: uri.to_string(),
            hosts: hosts.to_string(),
            options,
            username,
            password,
            ssl_enabled,
            verify_server_cert,
            connection_string,
        })
    }

    /// The unparsed URI as passed to [`ClientUri::parse`].
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The host-and-path segment, e.g. `host1,host2`.
    pub fn hosts(&self) -> &str {
        &self.hosts
    }

    /// The parsed option map, `None` when the URI carried no `?` section.
    ///
    /// Keys are lowercased; each key maps to its values in encounter order.
    pub fn options(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.options.as_ref()
    }

    /// Resolved username, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Resolved password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Whether TLS is enabled for this connection.
    pub fn ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }

    /// Whether the server certificate must be verified (TLS only).
    pub fn verify_server_cert(&self) -> bool {
        self.verify_server_cert
    }

    /// The normalized connection string: host segment plus re-serialized
    /// non-reserved options, without a scheme.
    ///
    /// Keys are emitted in lexicographic order, each with its last value.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// The connection string with the scheme chosen by the TLS setting.
    pub fn connection_string_with_scheme(&self) -> String {
        let scheme = if self.ssl_enabled {
            SECURE_SCHEME
        } else {
            PLAIN_SCHEME
        };
        format!("{scheme}{}", self.connection_string)
    }
}

impl fmt::Display for ClientUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Coerce an option value to bool. Only a case-insensitive `"true"` is
/// true; anything else (including `"1"`, `"yes"`, malformed text) is false.
fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Parse a raw query string into an option map.
///
/// Splits on `&`, then each fragment at its first `=`. Keys are lowercased;
/// values are kept raw (no percent-decoding). Fragments without `=` are
/// dropped without signaling.
fn parse_options(raw: &str) -> OptionMap {
    let mut options = OptionMap::new();
    for fragment in raw.split('&') {
        if let Some(idx) = fragment.find('=') {
            let key = fragment[..idx].to_ascii_lowercase();
            let value = fragment[idx + 1..].to_string();
            options.entry(key).or_default().push(value);
        }
    }
    options
}

/// Last occurrence of `key` in the option map, if any.
fn last_value<'a>(options: Option<&'a OptionMap>, key: &str) -> Option<&'a str> {
    options?
        .get(key)
        .and_then(|values| values.last())
        .map(String::as_str)
}

/// Resolve one reserved setting: overrides win outright, then the URI's
/// last value for the key.
fn resolve_option(
    overrides: Option<&HashMap<String, String>>,
    options: Option<&OptionMap>,
    key: &str,
) -> Option<String> {
    if let Some(value) = overrides.and_then(|map| map.get(key)) {
        return Some(value.clone());
    }
    last_value(options, key).map(str::to_string)
}

/// Re-serialize the host segment plus non-reserved options.
///
/// No options at all yields the host segment verbatim. When options were
/// parsed but every key is reserved the result keeps a trailing `?`.
fn build_connection_string(hosts: &str, options: Option<&OptionMap>) -> String {
    let Some(options) = options else {
        return hosts.to_string();
    };
    let pairs = options
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, values)| {
            let value = values.last().map(String::as_str).unwrap_or("");
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{hosts}?{pairs}")
}

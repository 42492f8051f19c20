//! Transport options.

use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// DSN scheme handled by the test transport.
pub const TEST_SCHEME: &str = "test";

/// Behaviour switches of an [`InMemoryTransport`](crate::InMemoryTransport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Queue sent messages instead of handling them right away.
    pub intercept: bool,
    /// Turn handler failures into rejects instead of returning them.
    pub catch_exceptions: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            intercept: true,
            catch_exceptions: true,
        }
    }
}

impl TransportOptions {
    /// Parses options from a `test://` DSN.
    ///
    /// ```
    /// use messenger_test_transport::TransportOptions;
    ///
    /// let options = TransportOptions::from_dsn("test://?intercept=false").unwrap();
    /// assert!(!options.intercept);
    /// assert!(options.catch_exceptions);
    /// ```
    pub fn from_dsn(dsn: &str) -> TransportResult<Self> {
        let url = Url::parse(dsn).map_err(|e| TransportError::InvalidDsn(format!("{dsn}: {e}")))?;

        if url.scheme() != TEST_SCHEME {
            return Err(TransportError::InvalidDsn(format!(
                "{dsn}: expected the \"{TEST_SCHEME}://\" scheme"
            )));
        }

        let mut options = Self::default();
        for (key, value) in url.query_pairs() {
            match &*key {
                "intercept" => options.intercept = parse_flag(&key, &value)?,
                "catch_exceptions" => options.catch_exceptions = parse_flag(&key, &value)?,
                other => {
                    return Err(TransportError::InvalidDsn(format!(
                        "{dsn}: unknown option \"{other}\""
                    )))
                }
            }
        }

        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> TransportResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TransportError::InvalidDsn(format!(
            "option \"{key}\" expects a boolean, got \"{value}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_intercept_and_catch() {
        let options = TransportOptions::default();
        assert!(options.intercept);
        assert!(options.catch_exceptions);
    }

    #[test]
    fn bare_dsn_uses_defaults() {
        assert_eq!(
            TransportOptions::from_dsn("test://").unwrap(),
            TransportOptions::default()
        );
    }

    #[test]
    fn dsn_query_overrides_both_flags() {
        let options = TransportOptions::from_dsn("test://?intercept=false&catch_exceptions=0").unwrap();
        assert!(!options.intercept);
        assert!(!options.catch_exceptions);
    }

    #[test]
    fn dsn_rejects_other_schemes() {
        let err = TransportOptions::from_dsn("amqp://localhost/%2f/messages").unwrap_err();
        assert!(matches!(err, TransportError::InvalidDsn(_)));
    }

    #[test]
    fn dsn_rejects_unknown_options_and_bad_flags() {
        assert!(matches!(
            TransportOptions::from_dsn("test://?retries=3"),
            Err(TransportError::InvalidDsn(msg)) if msg.contains("retries")
        ));
        assert!(matches!(
            TransportOptions::from_dsn("test://?intercept=maybe"),
            Err(TransportError::InvalidDsn(msg)) if msg.contains("intercept")
        ));
    }

    #[test]
    fn deserializes_with_missing_fields_defaulted() {
        let options: TransportOptions = serde_json::from_str(r#"{"intercept": false}"#).unwrap();
        assert!(!options.intercept);
        assert!(options.catch_exceptions);
    }
}

// Copyright 2025 Cowboy AI, LLC.

//! Error taxonomy for WBEM client operations.

use thiserror::Error;

use crate::instance::CIMInstance;

/// The DMTF `CIM_ERR_*` status codes, as returned in an `<ERROR CODE="...">`
/// element (DSP0200 Table 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CimStatusCode(pub u32);

impl CimStatusCode {
    /// The DMTF mnemonic for this code, or `None` for codes outside the
    /// defined 1..=28 range (servers MAY still send them; we surface the
    /// raw code rather than fail to parse).
    pub fn mnemonic(self) -> Option<&'static str> {
        Some(match self.0 {
            1 => "CIM_ERR_FAILED",
            2 => "CIM_ERR_ACCESS_DENIED",
            3 => "CIM_ERR_INVALID_NAMESPACE",
            4 => "CIM_ERR_INVALID_PARAMETER",
            5 => "CIM_ERR_INVALID_CLASS",
            6 => "CIM_ERR_NOT_FOUND",
            7 => "CIM_ERR_NOT_SUPPORTED",
            8 => "CIM_ERR_CLASS_HAS_CHILDREN",
            9 => "CIM_ERR_CLASS_HAS_INSTANCES",
            10 => "CIM_ERR_INVALID_SUPERCLASS",
            11 => "CIM_ERR_ALREADY_EXISTS",
            12 => "CIM_ERR_NO_SUCH_PROPERTY",
            13 => "CIM_ERR_TYPE_MISMATCH",
            14 => "CIM_ERR_QUERY_LANGUAGE_NOT_SUPPORTED",
            15 => "CIM_ERR_INVALID_QUERY",
            16 => "CIM_ERR_METHOD_NOT_AVAILABLE",
            17 => "CIM_ERR_METHOD_NOT_FOUND",
            18 => "CIM_ERR_UNEXPECTED_RESPONSE",
            19 => "CIM_ERR_INVALID_RESPONSE_DESTINATION",
            20 => "CIM_ERR_NAMESPACE_NOT_EMPTY",
            21 => "CIM_ERR_INVALID_ENUMERATION_CONTEXT",
            22 => "CIM_ERR_INVALID_OPERATION_TIMEOUT",
            23 => "CIM_ERR_PULL_HAS_BEEN_ABANDONED",
            24 => "CIM_ERR_PULL_CANNOT_BE_ABANDONED",
            25 => "CIM_ERR_FILTERED_ENUMERATION_NOT_SUPPORTED",
            26 => "CIM_ERR_CONTINUATION_ON_ERROR_NOT_SUPPORTED",
            27 => "CIM_ERR_SERVER_LIMITS_EXCEEDED",
            28 => "CIM_ERR_SERVER_IS_SHUTTING_DOWN",
            _ => return None,
        })
    }
}

impl std::fmt::Display for CimStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mnemonic() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "CIM_ERR_UNKNOWN ({})", self.0),
        }
    }
}

/// The error taxonomy a `WbemConnection` operation can raise.
///
/// Local preconditions fail as [`WbemError::Model`] before any bytes go on
/// the wire; transport failures, HTTP status, and CIM-XML `<ERROR>`
/// responses each get their own variant so callers can match on failure
/// class without string-parsing a message.
#[derive(Debug, Error)]
pub enum WbemError {
    /// The server returned a CIM-XML `<ERROR>` element.
    #[error("{code}: {description}")]
    Cim {
        /// The DMTF status code reported by the server.
        code: CimStatusCode,
        /// The human-readable description from the `<ERROR>` element.
        description: String,
        /// Any nested `<INSTANCE>` elements carried as error detail.
        instances: Vec<CIMInstance>,
    },

    /// Could not establish or maintain the underlying connection (DNS,
    /// refused, TLS handshake, connection reset past the retry budget).
    #[error("connection error: {0}")]
    Connection(String),

    /// A 401 response for which no further credential is available.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The operation's timeout elapsed before a response was received.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The server responded with a non-200 HTTP status, or without the
    /// required `CIMOperation: MethodResponse` header.
    #[error("HTTP error: status {status}, {message}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// A short description of what was wrong with the response.
        message: String,
    },

    /// The response body was not well-formed CIM-XML, or contained an
    /// element/attribute the decoder does not recognize.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// 1-based line number of the offending content.
        line: usize,
        /// 1-based column number of the offending content.
        column: usize,
        /// Description of the violation.
        message: String,
    },

    /// The document's `DTDVERSION` was not a `2.x` version this client
    /// understands.
    #[error("unsupported DTD version: {0}")]
    Version(String),

    /// A local precondition was violated before any request was sent:
    /// missing namespace, conflicting arguments, invalid type code,
    /// array/scalar mismatch, or an operation attempted against an
    /// enumeration context in the wrong state.
    #[error("invalid request: {0}")]
    Model(String),
}

/// Result type for WBEM client operations.
pub type WbemResult<T> = Result<T, WbemError>;

impl WbemError {
    /// Construct a [`WbemError::Model`] from a message.
    pub fn model(msg: impl Into<String>) -> Self {
        WbemError::Model(msg.into())
    }

    /// True for [`WbemError::Cim`] carrying `CIM_ERR_NOT_FOUND`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WbemError::Cim { code, .. } if code.0 == 6)
    }

    /// True for [`WbemError::Cim`] carrying `CIM_ERR_ACCESS_DENIED`, or for
    /// [`WbemError::Auth`].
    pub fn is_access_denied(&self) -> bool {
        matches!(self, WbemError::Cim { code, .. } if code.0 == 2) || self.is_auth()
    }

    /// True for [`WbemError::Auth`].
    pub fn is_auth(&self) -> bool {
        matches!(self, WbemError::Auth(_))
    }

    /// True for [`WbemError::Connection`].
    pub fn is_connection(&self) -> bool {
        matches!(self, WbemError::Connection(_))
    }

    /// True for [`WbemError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, WbemError::Timeout(_))
    }
}

impl From<quick_xml::Error> for WbemError {
    fn from(err: quick_xml::Error) -> Self {
        WbemError::Parse {
            line: 0,
            column: 0,
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for WbemError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        WbemError::Parse {
            line: 0,
            column: 0,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for WbemError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WbemError::Timeout(std::time::Duration::default())
        } else if err.is_connect() {
            WbemError::Connection(err.to_string())
        } else {
            WbemError::Connection(err.to_string())
        }
    }
}

impl From<url::ParseError> for WbemError {
    fn from(err: url::ParseError) -> Self {
        WbemError::Model(format!("invalid URL: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_table_matches_dmtf_codes() {
        assert_eq!(CimStatusCode(1).mnemonic(), Some("CIM_ERR_FAILED"));
        assert_eq!(CimStatusCode(2).mnemonic(), Some("CIM_ERR_ACCESS_DENIED"));
        assert_eq!(
            CimStatusCode(3).mnemonic(),
            Some("CIM_ERR_INVALID_NAMESPACE")
        );
        assert_eq!(CimStatusCode(6).mnemonic(), Some("CIM_ERR_NOT_FOUND"));
        assert_eq!(
            CimStatusCode(28).mnemonic(),
            Some("CIM_ERR_SERVER_IS_SHUTTING_DOWN")
        );
        assert_eq!(CimStatusCode(999).mnemonic(), None);
    }

    #[test]
    fn is_not_found_only_matches_code_six() {
        let err = WbemError::Cim {
            code: CimStatusCode(6),
            description: "no such instance".into(),
            instances: vec![],
        };
        assert!(err.is_not_found());
        assert!(!err.is_access_denied());

        let denied = WbemError::Cim {
            code: CimStatusCode(2),
            description: "denied".into(),
            instances: vec![],
        };
        assert!(denied.is_access_denied());
        assert!(!denied.is_not_found());
    }

    #[test]
    fn model_constructor_wraps_message() {
        let err = WbemError::model("missing namespace");
        assert_eq!(err.to_string(), "invalid request: missing namespace");
    }
}

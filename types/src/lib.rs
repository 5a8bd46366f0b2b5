//! Core domain types for consulta.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: the validated query key, the canonical address record, and
//! the classified lookup error taxonomy shared by every backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Query Key
// ============================================================================

/// A validated CEP (Brazilian postal code): exactly eight ASCII digits.
///
/// Construction goes through [`Cep::parse`], which trims surrounding
/// whitespace first. The inner string is never mutated after validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CepParseError {
    #[error("CEP must be exactly 8 digits, got {0} characters")]
    Length(usize),
    #[error("CEP must contain only digits")]
    NonDigit,
}

impl Cep {
    pub fn parse(input: &str) -> Result<Self, CepParseError> {
        let input = input.trim();
        let char_count = input.chars().count();
        if char_count != 8 {
            return Err(CepParseError::Length(char_count));
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CepParseError::NonDigit);
        }
        Ok(Self(input.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Canonical Address Record
// ============================================================================

/// Normalized address record, independent of which backend produced it.
///
/// Fields a backend does not supply stay empty strings; values are never
/// defaulted across backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub street: String,
    /// Tag of the upstream service that supplied the record, when the
    /// backend reports one.
    pub service: String,
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Classified failure of a single lookup attempt.
///
/// Adapters classify immediately; the dispatcher never inspects the variant,
/// it only distinguishes success from failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Connection, DNS, or IO failure before a response was obtained.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-200 status.
    #[error("backend returned status code {0}")]
    HttpStatus(u16),
    /// A 200 response whose body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(String),
    /// A well-formed response explicitly signaling the key is unknown.
    #[error("cep not found")]
    NotFound,
    /// The shared deadline elapsed with no success.
    #[error("Timeout")]
    Timeout,
}

/// Result of one adapter attempt, tagged with the backend that produced it.
///
/// Exactly one `Outcome` is consumed as "the" result per query; the rest are
/// discarded when the race is decided.
#[derive(Debug)]
pub struct Outcome {
    pub backend: &'static str,
    pub result: Result<Address, LookupError>,
}

#[cfg(test)]
mod tests {
    use super::{Address, Cep, CepParseError, LookupError};

    #[test]
    fn cep_parse_accepts_eight_digits() {
        let cep = Cep::parse("01001000").unwrap();
        assert_eq!(cep.as_str(), "01001000");
    }

    #[test]
    fn cep_parse_trims_whitespace() {
        let cep = Cep::parse("  01001000\n").unwrap();
        assert_eq!(cep.as_str(), "01001000");
    }

    #[test]
    fn cep_parse_rejects_wrong_length() {
        assert_eq!(Cep::parse("0100100"), Err(CepParseError::Length(7)));
        assert_eq!(Cep::parse("010010001"), Err(CepParseError::Length(9)));
        assert_eq!(Cep::parse(""), Err(CepParseError::Length(0)));
    }

    #[test]
    fn cep_parse_rejects_non_digits() {
        assert_eq!(Cep::parse("01001-00"), Err(CepParseError::NonDigit));
        assert_eq!(Cep::parse("abcdefgh"), Err(CepParseError::NonDigit));
    }

    #[test]
    fn cep_parse_counts_characters_not_bytes() {
        // Eight characters with a multi-byte one is a digit problem, not a
        // length problem.
        assert_eq!(Cep::parse("0100100é"), Err(CepParseError::NonDigit));
    }

    #[test]
    fn address_defaults_to_empty_fields() {
        let address = Address::default();
        assert!(address.cep.is_empty());
        assert!(address.street.is_empty());
        assert!(address.service.is_empty());
    }

    #[test]
    fn address_serializes_all_fields() {
        let address = Address {
            cep: "01001000".into(),
            state: "SP".into(),
            city: "São Paulo".into(),
            ..Address::default()
        };
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["cep"], "01001000");
        assert_eq!(json["state"], "SP");
        assert_eq!(json["street"], "");
    }

    #[test]
    fn timeout_displays_bare_word() {
        // The driver renders this as "Error: Timeout".
        assert_eq!(LookupError::Timeout.to_string(), "Timeout");
    }

    #[test]
    fn lookup_errors_render_one_line_messages() {
        assert_eq!(
            LookupError::Transport("connection refused".into()).to_string(),
            "transport error: connection refused"
        );
        assert_eq!(
            LookupError::HttpStatus(404).to_string(),
            "backend returned status code 404"
        );
        assert_eq!(
            LookupError::Decode("expected value at line 1".into()).to_string(),
            "failed to decode response body: expected value at line 1"
        );
        assert_eq!(LookupError::NotFound.to_string(), "cep not found");
    }
}

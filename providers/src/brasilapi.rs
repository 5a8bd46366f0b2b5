//! BrasilAPI directory client.
//!
//! Flat JSON schema served from `https://brasilapi.com.br/api/cep/v1/{cep}`.
//! Unknown keys come back as HTTP 404, so this backend has no in-body
//! not-found marker.

use crate::Directory;
use consulta_types::{Address, Cep, LookupError};
use serde::Deserialize;

/// Canonical BrasilAPI host.
pub const BRASILAPI_BASE_URL: &str = "https://brasilapi.com.br";

/// Native BrasilAPI response shape.
#[derive(Debug, Clone, Deserialize)]
pub struct BrasilApiAddress {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub street: String,
    /// Which upstream source BrasilAPI itself consulted.
    #[serde(default)]
    pub service: String,
}

impl From<BrasilApiAddress> for Address {
    fn from(native: BrasilApiAddress) -> Self {
        Self {
            cep: native.cep,
            state: native.state,
            city: native.city,
            neighborhood: native.neighborhood,
            street: native.street,
            service: native.service,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrasilApi {
    base_url: String,
}

impl BrasilApi {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BRASILAPI_BASE_URL)
    }

    /// Point the adapter at a different host (used by tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for BrasilApi {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory for BrasilApi {
    fn name(&self) -> &'static str {
        "BrasilAPI"
    }

    fn url(&self, cep: &Cep) -> String {
        format!("{}/api/cep/v1/{cep}", self.base_url)
    }

    fn decode(&self, body: &[u8]) -> Result<Address, LookupError> {
        let native: BrasilApiAddress =
            serde_json::from_slice(body).map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(native.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{BRASILAPI_BASE_URL, BrasilApi};
    use crate::Directory;
    use consulta_types::{Cep, LookupError};

    const BODY: &str = r#"{
        "cep": "01001000",
        "state": "SP",
        "city": "São Paulo",
        "neighborhood": "Sé",
        "street": "Praça da Sé",
        "service": "open-cep"
    }"#;

    #[test]
    fn url_uses_v1_path() {
        let cep = Cep::parse("01001000").unwrap();
        assert_eq!(
            BrasilApi::new().url(&cep),
            format!("{BRASILAPI_BASE_URL}/api/cep/v1/01001000")
        );
    }

    #[test]
    fn decode_maps_flat_schema() {
        let address = BrasilApi::new().decode(BODY.as_bytes()).unwrap();
        assert_eq!(address.cep, "01001000");
        assert_eq!(address.state, "SP");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.neighborhood, "Sé");
        assert_eq!(address.street, "Praça da Sé");
        assert_eq!(address.service, "open-cep");
    }

    #[test]
    fn decode_leaves_missing_fields_empty() {
        let address = BrasilApi::new()
            .decode(br#"{"cep": "01001000", "state": "SP"}"#)
            .unwrap();
        assert_eq!(address.state, "SP");
        assert!(address.city.is_empty());
        assert!(address.street.is_empty());
    }

    #[test]
    fn decode_rejects_malformed_body() {
        let result = BrasilApi::new().decode(b"not json at all");
        assert!(matches!(result, Err(LookupError::Decode(_))));
    }

    #[test]
    fn normalization_is_pure() {
        let dir = BrasilApi::new();
        let first = dir.decode(BODY.as_bytes()).unwrap();
        let second = dir.decode(BODY.as_bytes()).unwrap();
        assert_eq!(first, second);
    }
}

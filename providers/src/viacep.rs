//! ViaCEP directory client.
//!
//! Legacy JSON schema served from `http://viacep.com.br/ws/{cep}/json/`.
//! Unknown keys come back as HTTP 200 with an `erro` flag in the body, which
//! this adapter classifies as [`LookupError::NotFound`].

use crate::Directory;
use consulta_types::{Address, Cep, LookupError};
use serde::Deserialize;

/// Canonical ViaCEP host.
pub const VIACEP_BASE_URL: &str = "http://viacep.com.br";

/// The `erro` not-found flag. The live API has served it both as the string
/// `"true"` and as boolean `true`, so both spellings are recognized.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErroFlag {
    Bool(bool),
    Text(String),
}

impl ErroFlag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => text == "true",
        }
    }
}

/// Native ViaCEP response shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ViaCepAddress {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub unidade: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default)]
    pub ibge: String,
    #[serde(default)]
    pub gia: String,
    #[serde(default)]
    pub ddd: String,
    #[serde(default)]
    pub siafi: String,
    pub erro: Option<ErroFlag>,
}

impl From<ViaCepAddress> for Address {
    fn from(native: ViaCepAddress) -> Self {
        // ViaCEP reports no upstream service tag; that field stays empty
        // rather than being defaulted.
        Self {
            cep: native.cep,
            state: native.uf,
            city: native.localidade,
            neighborhood: native.bairro,
            street: native.logradouro,
            service: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViaCep {
    base_url: String,
}

impl ViaCep {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(VIACEP_BASE_URL)
    }

    /// Point the adapter at a different host (used by tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for ViaCep {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory for ViaCep {
    fn name(&self) -> &'static str {
        "ViaCEP"
    }

    fn url(&self, cep: &Cep) -> String {
        format!("{}/ws/{cep}/json/", self.base_url)
    }

    fn decode(&self, body: &[u8]) -> Result<Address, LookupError> {
        let native: ViaCepAddress =
            serde_json::from_slice(body).map_err(|e| LookupError::Decode(e.to_string()))?;
        if native.erro.as_ref().is_some_and(ErroFlag::is_set) {
            return Err(LookupError::NotFound);
        }
        Ok(native.into())
    }
}

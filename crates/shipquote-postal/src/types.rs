//! Response types for the ViaCEP-compatible address lookup service.

use serde::Deserialize;

/// Body of `GET /{cep}/json/`.
///
/// Every field is optional because the not-found body is just
/// `{"erro": true}`. Newer deployments send `"erro": "true"` as a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressResponse {
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub logradouro: Option<String>,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub localidade: Option<String>,
    #[serde(default)]
    pub uf: Option<String>,
    #[serde(default)]
    pub erro: Option<serde_json::Value>,
}

impl AddressResponse {
    /// `true` when the service flagged the code as unknown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Locality and state, if both are present and non-blank.
    #[must_use]
    pub fn locality_and_state(&self) -> Option<(&str, &str)> {
        let locality = self.localidade.as_deref().map(str::trim)?;
        let state = self.uf.as_deref().map(str::trim)?;
        if locality.is_empty() || state.is_empty() {
            return None;
        }
        Some((locality, state))
    }
}

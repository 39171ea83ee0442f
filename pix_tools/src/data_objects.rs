use serde::{Deserialize, Serialize};

/// The provider's literal status value for a settled charge. Anything else
/// (`ATIVA`, `EM_PROCESSAMENTO`, and friends) means the charge has not been
/// paid yet.
pub const COMPLETED_STATUS: &str = "COMPLETED";

//--------------------------------------   Wire payloads     ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChargeRequest {
    pub expiration_secs: u32,
    pub payer: ChargePayer,
    /// Decimal string, e.g. `37.50`.
    pub amount: String,
    pub receiving_key: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChargePayer {
    pub name: String,
    /// Bare digits; punctuation is stripped before the request goes out.
    pub tax_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChargeRecord {
    pub txid: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PayablePayloadResponse {
    pub payable_code_base64: String,
    pub qr_image: String,
}

//--------------------------------------   Client results    ---------------------------------------------------------

/// Everything a caller needs to present a freshly created charge to the payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeCreation {
    pub transaction_id: String,
    /// The copy-and-paste payable code, already decoded to plain text.
    pub payable_code: String,
    /// Opaque QR image payload, passed through exactly as the provider sent
    /// it.
    pub qr_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayablePayload {
    pub payable_code: String,
    pub qr_image: String,
}

/// Charge status reduced to the one distinction the reconciliation flow
/// cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeStatus {
    pub transaction_id: String,
    pub completed: bool,
    /// The provider's literal status value, kept for logging.
    pub provider_status: String,
}

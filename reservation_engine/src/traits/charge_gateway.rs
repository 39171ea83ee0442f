use prg_common::Brl;
use thiserror::Error;

/// Outbound operations the engine needs from the payment provider.
///
/// The engine never talks to the provider directly. A thin adapter over the concrete client
/// implements this trait, which keeps the reconciliation logic exercisable against scripted
/// gateways in tests.
#[allow(async_fn_in_trait)]
pub trait ChargeGateway: Clone {
    /// Creates a charge for `amount`, payable by the named payer.
    ///
    /// Implementations must return `Ok` only when the charge *and* its payable payload were both
    /// retrieved; a half-created charge is reported as an error so nothing gets persisted for it.
    async fn create_charge(
        &self,
        amount: Brl,
        payer_name: &str,
        payer_tax_id: &str,
    ) -> Result<ChargeCreation, ChargeGatewayError>;

    /// Fetches the current status of the charge `txid`.
    async fn charge_status(&self, txid: &str) -> Result<ChargeStatus, ChargeGatewayError>;
}

/// A successfully created charge, ready to be presented to the payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeCreation {
    pub transaction_id: String,
    /// Copy-and-paste payable code, in plain text.
    pub payable_code: String,
    /// Opaque QR image payload, exactly as the provider sent it.
    pub qr_image: String,
}

/// Provider charge status reduced to the completed / pending distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeStatus {
    pub completed: bool,
    /// The provider's literal status value, kept for logging.
    pub provider_status: String,
}

impl ChargeStatus {
    pub fn settled(provider_status: &str) -> Self {
        Self { completed: true, provider_status: provider_status.to_string() }
    }

    pub fn pending(provider_status: &str) -> Self {
        Self { completed: false, provider_status: provider_status.to_string() }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ChargeGatewayError {
    #[error("Token acquisition failed: {0}")]
    Token(String),
    #[error("Charge creation failed: {0}")]
    Creation(String),
    #[error("Charge status query for {txid} failed: {message}")]
    Query { txid: String, message: String },
    #[error("Payable payload fetch for {txid} failed: {message}")]
    Payload { txid: String, message: String },
}

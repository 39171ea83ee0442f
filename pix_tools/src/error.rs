use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),
    #[error("Charge creation failed: {0}")]
    ChargeCreation(String),
    #[error("Charge status query for {txid} failed: {message}")]
    ChargeQuery { txid: String, message: String },
    #[error("Payable payload fetch for {txid} failed: {message}")]
    PayloadFetch { txid: String, message: String },
}

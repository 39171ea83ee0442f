use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::*;
use prg_common::{helpers::normalize_tax_id, Brl};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Identity,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    config::PixConfig,
    data_objects::{
        ChargeCreation,
        ChargePayer,
        ChargeRecord,
        ChargeRequest,
        ChargeStatus,
        PayablePayload,
        PayablePayloadResponse,
        COMPLETED_STATUS,
    },
    token::{AccessToken, TokenProvider},
    PixApiError,
};

/// Client for the provider's charge API.
///
/// One instance owns a single mTLS-capable HTTP client. Every operation asks
/// the [`TokenProvider`] for a fresh bearer token before touching the charge
/// endpoints.
#[derive(Clone)]
pub struct PixApi {
    config: PixConfig,
    client: Arc<Client>,
    tokens: TokenProvider,
}

impl PixApi {
    /// Builds the client from the PKCS#12 identity named in `config`. The
    /// provider rejects connections without the client certificate, so this
    /// fails fast when the bundle cannot be read or decrypted.
    pub fn new(config: PixConfig) -> Result<Self, PixApiError> {
        let bundle = std::fs::read(&config.identity_file).map_err(|e| {
            PixApiError::Initialization(format!("could not read {}: {e}", config.identity_file.display()))
        })?;
        let identity = Identity::from_pkcs12_der(&bundle, config.identity_passphrase.reveal())
            .map_err(|e| PixApiError::Initialization(e.to_string()))?;
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .identity(identity)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PixApiError::Initialization(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an already-built HTTP client. Lets tests point the API at a mock
    /// server over plain HTTP; production code goes through [`PixApi::new`] so
    /// the channel is mutually authenticated.
    pub fn with_client(client: Client, config: PixConfig) -> Self {
        let client = Arc::new(client);
        let tokens = TokenProvider::new(Arc::clone(&client), config.clone());
        Self { config, client, tokens }
    }

    pub fn config(&self) -> &PixConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Creates a charge for `amount` payable by the named payer, then fetches
    /// its payable payload.
    ///
    /// The charge expires after the configured window and credits the
    /// configured receiving key. Punctuation in `payer_tax_id` is stripped
    /// before the request goes out.
    ///
    /// The two provider calls succeed or fail as a unit: if the payload fetch
    /// fails the whole creation errs and the caller must treat the charge as
    /// not created.
    pub async fn create_charge(
        &self,
        amount: Brl,
        payer_name: &str,
        payer_tax_id: &str,
    ) -> Result<ChargeCreation, PixApiError> {
        let token = self.tokens.get_token().await?;
        let body = ChargeRequest {
            expiration_secs: self.config.charge_expiry_secs,
            payer: ChargePayer { name: payer_name.to_string(), tax_id: normalize_tax_id(payer_tax_id) },
            amount: amount.to_wire(),
            receiving_key: self.config.receiving_key.clone(),
            description: self.config.charge_description.clone(),
        };
        debug!("💸️ Creating charge of {amount} for {payer_name}");
        let record: ChargeRecord = self
            .request(Method::POST, "/charges", &token, Some(&body))
            .await
            .map_err(|e| PixApiError::ChargeCreation(e.to_string()))?;
        info!("💸️ Charge {} created. Fetching its payable payload", record.txid);
        let payload = self.fetch_payable_payload(&record.txid).await?;
        Ok(ChargeCreation {
            transaction_id: record.txid,
            payable_code: payload.payable_code,
            qr_image: payload.qr_image,
        })
    }

    /// Fetches the provider's record for `txid` and reduces its status to the
    /// completed / not-completed distinction.
    pub async fn fetch_charge_status(&self, txid: &str) -> Result<ChargeStatus, PixApiError> {
        let token = self.tokens.get_token().await?;
        let path = format!("/charges/{txid}");
        let record = self
            .request::<ChargeRecord, ()>(Method::GET, &path, &token, None)
            .await
            .map_err(|e| PixApiError::ChargeQuery { txid: txid.to_string(), message: e.to_string() })?;
        let completed = record.status == COMPLETED_STATUS;
        debug!("💸️ Charge {txid} status is {} (completed: {completed})", record.status);
        Ok(ChargeStatus { transaction_id: record.txid, completed, provider_status: record.status })
    }

    /// Fetches the payable payload for a charge. The provider sends the
    /// copy-and-paste code base64-encoded; it is decoded to plain text here.
    /// The QR image is passed through untouched.
    pub async fn fetch_payable_payload(&self, txid: &str) -> Result<PayablePayload, PixApiError> {
        let fetch_err = |message: String| PixApiError::PayloadFetch { txid: txid.to_string(), message };
        let token = self.tokens.get_token().await?;
        let path = format!("/charges/{txid}/payable-payload");
        let response = self
            .request::<PayablePayloadResponse, ()>(Method::GET, &path, &token, None)
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        let decoded = BASE64
            .decode(response.payable_code_base64.as_bytes())
            .map_err(|e| fetch_err(format!("payable code is not valid base64: {e}")))?;
        let payable_code =
            String::from_utf8(decoded).map_err(|e| fetch_err(format!("decoded payable code is not UTF-8: {e}")))?;
        trace!("💸️ Payable payload for {txid} fetched ({} chars)", payable_code.len());
        Ok(PayablePayload { payable_code, qr_image: response.qr_image })
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: &AccessToken,
        body: Option<&B>,
    ) -> Result<T, RequestFailure> {
        let url = self.url(path);
        trace!("💸️ {method} {url}");
        let mut req = self.client.request(method, url).bearer_auth(token.reveal());
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| RequestFailure::Transport(e.to_string()))?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| RequestFailure::Json(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RequestFailure::Transport(e.to_string()))?;
            Err(RequestFailure::Status { status, message })
        }
    }
}

/// Low-level failure detail. Folded into the per-operation error variants so
/// callers always know which operation fell over.
#[derive(Debug, Error)]
enum RequestFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("Error {status}. {message}")]
    Status { status: u16, message: String },
    #[error("could not deserialize response: {0}")]
    Json(String),
}

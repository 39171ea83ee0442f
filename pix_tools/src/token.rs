use std::{fmt, fmt::Debug, sync::Arc};

use log::*;
use prg_common::Secret;
use reqwest::Client;

use crate::{config::PixConfig, data_objects::TokenResponse, PixApiError};

/// A short-lived bearer token for the charge API.
#[derive(Clone, Default)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    pub fn reveal(&self) -> &str {
        self.0.reveal()
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

/// Exchanges the fixed client credentials for a bearer token over the
/// client-certificate channel.
///
/// Tokens are not cached. Every dependent operation asks for a fresh one,
/// trading a little latency for immunity to token expiry races.
#[derive(Clone)]
pub struct TokenProvider {
    client: Arc<Client>,
    config: PixConfig,
}

impl TokenProvider {
    pub fn new(client: Arc<Client>, config: PixConfig) -> Self {
        Self { client, config }
    }

    /// POSTs the form-encoded credential exchange and returns the bearer
    /// token. Any failure here aborts the calling operation.
    pub async fn get_token(&self) -> Result<AccessToken, PixApiError> {
        let url = format!("{}/token", self.config.base_url);
        trace!("💸️ Requesting access token from {url}");
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.reveal().as_str()),
            ("scope", self.config.scope.as_str()),
        ];
        let response =
            self.client.post(url).form(&form).send().await.map_err(|e| PixApiError::TokenAcquisition(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PixApiError::TokenAcquisition(e.to_string()))?;
            return Err(PixApiError::TokenAcquisition(format!("Error {status}. {message}")));
        }
        let token =
            response.json::<TokenResponse>().await.map_err(|e| PixApiError::TokenAcquisition(e.to_string()))?;
        trace!("💸️ Access token obtained");
        Ok(AccessToken::new(token.access_token))
    }
}

use pix_tools::{PixApi, PixApiError};
use prg_common::Brl;
use reservation_engine::traits::{ChargeCreation, ChargeGateway, ChargeGatewayError, ChargeStatus};

/// [`ChargeGateway`] adapter over the PIX provider client.
#[derive(Clone)]
pub struct PixChargeGateway {
    api: PixApi,
}

impl PixChargeGateway {
    pub fn new(api: PixApi) -> Self {
        Self { api }
    }
}

impl ChargeGateway for PixChargeGateway {
    async fn create_charge(
        &self,
        amount: Brl,
        payer_name: &str,
        payer_tax_id: &str,
    ) -> Result<ChargeCreation, ChargeGatewayError> {
        let charge = self.api.create_charge(amount, payer_name, payer_tax_id).await.map_err(into_gateway_error)?;
        Ok(ChargeCreation {
            transaction_id: charge.transaction_id,
            payable_code: charge.payable_code,
            qr_image: charge.qr_image,
        })
    }

    async fn charge_status(&self, txid: &str) -> Result<ChargeStatus, ChargeGatewayError> {
        let status = self.api.fetch_charge_status(txid).await.map_err(into_gateway_error)?;
        Ok(ChargeStatus { completed: status.completed, provider_status: status.provider_status })
    }
}

fn into_gateway_error(e: PixApiError) -> ChargeGatewayError {
    match e {
        PixApiError::Initialization(m) => ChargeGatewayError::Creation(m),
        PixApiError::TokenAcquisition(m) => ChargeGatewayError::Token(m),
        PixApiError::ChargeCreation(m) => ChargeGatewayError::Creation(m),
        PixApiError::ChargeQuery { txid, message } => ChargeGatewayError::Query { txid, message },
        PixApiError::PayloadFetch { txid, message } => ChargeGatewayError::Payload { txid, message },
    }
}

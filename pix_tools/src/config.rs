use std::{path::PathBuf, time::Duration};

use log::*;
use prg_common::Secret;

pub const DEFAULT_PIX_SCOPE: &str = "cob.read cob.write pix.read pix.write qrcode.read qrcode.write";

const DEFAULT_CHARGE_EXPIRY_SECS: u32 = 3600;
const DEFAULT_CHARGE_DESCRIPTION: &str = "Pagamento de reserva";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PixConfig {
    /// Base URL of the provider's charge API, without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// OAuth scope string sent with every token request.
    pub scope: String,
    /// The PIX key that receives the funds. Every charge is created against
    /// this key.
    pub receiving_key: String,
    /// Free text shown to the payer on the charge.
    pub charge_description: String,
    /// How long a charge stays payable, in seconds.
    pub charge_expiry_secs: u32,
    /// PKCS#12 bundle with the client certificate for the mutually
    /// authenticated channel the provider requires.
    pub identity_file: PathBuf,
    pub identity_passphrase: Secret<String>,
    /// Hard deadline applied to every outbound request.
    pub timeout: Duration,
}

impl Default for PixConfig {
    fn default() -> Self {
        Self {
            base_url: String::default(),
            client_id: String::default(),
            client_secret: Secret::default(),
            scope: DEFAULT_PIX_SCOPE.to_string(),
            receiving_key: String::default(),
            charge_description: DEFAULT_CHARGE_DESCRIPTION.to_string(),
            charge_expiry_secs: DEFAULT_CHARGE_EXPIRY_SECS,
            identity_file: PathBuf::default(),
            identity_passphrase: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PixConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("PRG_PIX_BASE_URL").unwrap_or_else(|_| {
            warn!("PRG_PIX_BASE_URL not set. Charge API calls will fail until it is configured.");
            String::default()
        });
        let client_id = std::env::var("PRG_PIX_CLIENT_ID").unwrap_or_else(|_| {
            warn!("PRG_PIX_CLIENT_ID not set. Token requests will be rejected by the provider.");
            String::default()
        });
        let client_secret = Secret::new(std::env::var("PRG_PIX_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("PRG_PIX_CLIENT_SECRET not set. Token requests will be rejected by the provider.");
            String::default()
        }));
        let scope = std::env::var("PRG_PIX_SCOPE").unwrap_or_else(|_| DEFAULT_PIX_SCOPE.to_string());
        let receiving_key = std::env::var("PRG_PIX_RECEIVING_KEY").unwrap_or_else(|_| {
            warn!("PRG_PIX_RECEIVING_KEY not set. Charge creation will be rejected by the provider.");
            String::default()
        });
        let charge_description =
            std::env::var("PRG_PIX_CHARGE_DESCRIPTION").unwrap_or_else(|_| DEFAULT_CHARGE_DESCRIPTION.to_string());
        let charge_expiry_secs = std::env::var("PRG_PIX_CHARGE_EXPIRY_SECS")
            .ok()
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    warn!("Invalid PRG_PIX_CHARGE_EXPIRY_SECS ({s}): {e}. Using {DEFAULT_CHARGE_EXPIRY_SECS}.");
                    DEFAULT_CHARGE_EXPIRY_SECS
                })
            })
            .unwrap_or(DEFAULT_CHARGE_EXPIRY_SECS);
        let identity_file = std::env::var("PRG_PIX_IDENTITY_FILE").map(PathBuf::from).unwrap_or_else(|_| {
            warn!("PRG_PIX_IDENTITY_FILE not set. The provider requires a client certificate; calls will fail.");
            PathBuf::default()
        });
        let identity_passphrase = Secret::new(std::env::var("PRG_PIX_IDENTITY_PASSPHRASE").unwrap_or_else(|_| {
            warn!("PRG_PIX_IDENTITY_PASSPHRASE not set. Using an empty passphrase.");
            String::default()
        }));
        let timeout = std::env::var("PRG_PIX_TIMEOUT_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    warn!("Invalid PRG_PIX_TIMEOUT_SECS ({s}): {e}. Using {DEFAULT_TIMEOUT_SECS}.");
                    DEFAULT_TIMEOUT_SECS
                })
            })
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self {
            base_url,
            client_id,
            client_secret,
            scope,
            receiving_key,
            charge_description,
            charge_expiry_secs,
            identity_file,
            identity_passphrase,
            timeout,
        }
    }
}

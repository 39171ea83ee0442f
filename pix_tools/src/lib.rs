mod api;
mod config;
mod error;
mod token;

mod data_objects;

pub use api::PixApi;
pub use config::{PixConfig, DEFAULT_PIX_SCOPE};
pub use data_objects::{ChargeCreation, ChargeStatus, PayablePayload, COMPLETED_STATUS};
pub use error::PixApiError;
pub use token::{AccessToken, TokenProvider};

mod brl;

pub mod helpers;
mod secret;

pub use brl::{Brl, BrlConversionError, BRL_CURRENCY_CODE};
pub use secret::Secret;

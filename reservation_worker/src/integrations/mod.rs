//! Adapters that plug the concrete provider client and delivery channels into the engine's
//! seams.
pub mod pix;
pub mod telegram;

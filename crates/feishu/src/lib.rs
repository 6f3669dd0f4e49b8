//! Feishu rich-card client.
//!
//! This crate is the single source of truth for the card wire
//! contract: credentials, tenant token, image upload, card assembly,
//! send and reply. Blocking reqwest client, no Tokio runtime
//! required, suitable for short-lived automation runs.
//!
//! ```no_run
//! use reportkit_feishu::{CardClient, CardElement};
//!
//! let client = CardClient::from_default_config()?;
//! let elements = [
//!     CardElement::Markdown("**Done!** All checks passed.".into()),
//!     CardElement::Image { path: "/tmp/plot.png".into(), alt: "results".into() },
//! ];
//! let receipt = client.send_rich_card("oc_xxx", "Report", &elements, "blue", None)?;
//! println!("{}", receipt.message_id);
//! # Ok::<(), reportkit_feishu::CardError>(())
//! ```

mod card;
mod client;
mod config;

pub use card::{
    card_payload, interleave_elements, sections_to_elements, CardElement, Section,
    DEFAULT_TEMPLATE,
};
pub use client::{CardClient, CardError, SendReceipt};
pub use config::{config_file_path, default_chat_id, load_credentials, CardCredentials};

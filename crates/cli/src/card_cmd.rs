//! Card send command.

use std::path::PathBuf;

use reportkit_feishu::{interleave_elements, CardClient, CardError};

use crate::exit_codes::*;
use crate::CliError;

pub fn cmd_send(
    chat: Option<String>,
    title: String,
    texts: Vec<String>,
    images: Vec<PathBuf>,
    template: String,
    reply_to: Option<String>,
) -> Result<(), CliError> {
    let chat = chat.filter(|c| !c.is_empty()).ok_or_else(|| CliError {
        code: EXIT_USAGE,
        message: "no chat id provided".into(),
        hint: Some("pass --chat or set FEISHU_DEFAULT_CHAT_ID".into()),
    })?;

    if texts.is_empty() && images.is_empty() {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "nothing to send".into(),
            hint: Some("pass --text and/or --image".into()),
        });
    }
    for image in &images {
        if !image.is_file() {
            return Err(CliError {
                code: EXIT_USAGE,
                message: format!("image not found: {}", image.display()),
                hint: None,
            });
        }
    }

    let client = CardClient::from_default_config().map_err(card_error)?;
    let elements = interleave_elements(&texts, &images);
    let receipt = client
        .send_rich_card(&chat, &title, &elements, &template, reply_to.as_deref())
        .map_err(card_error)?;

    println!("sent: message_id={}", receipt.message_id);
    Ok(())
}

fn card_error(err: CardError) -> CliError {
    match err {
        CardError::NotConfigured(msg) => CliError {
            code: EXIT_CARD_NOT_CONFIGURED,
            message: msg,
            hint: Some("add feishu appId/appSecret to ~/.openclaw/openclaw.json".into()),
        },
        CardError::Network(msg) => CliError {
            code: EXIT_CARD_NETWORK,
            message: format!("cannot reach the card API: {}", msg),
            hint: None,
        },
        CardError::Http(status, body) => CliError {
            code: EXIT_CARD_NETWORK,
            message: format!("HTTP {}: {}", status, body),
            hint: None,
        },
        CardError::Api { code, msg } => CliError {
            code: EXIT_CARD_API,
            message: format!("API error {}: {}", code, msg),
            hint: None,
        },
        other => CliError {
            code: EXIT_ERROR,
            message: other.to_string(),
            hint: None,
        },
    }
}

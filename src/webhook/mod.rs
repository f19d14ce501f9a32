// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Webhook delivery gate.
//!
//! ```text
//! WebhookDelivery { event, delivery_id, signature(s), body }
//!     |
//!     v
//! verify()   secret? -> signature? -> event? -> delivery id? -> HMAC
//!     |        401        401          422        401           401
//!     v
//! Orchestrator::handle_delivery()
//!     |
//!     v
//! WebhookResponse::from_result()
//!     Ignored(UnsupportedEvent)  200 "Pong!"
//!     Ignored(OwnBranch)         200 "Created by branchbot"
//!     Completed                  200 "Done!"
//!     malformed JSON             400 "Invalid body"
//!     any other error            400 <error text>
//! ```

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use tracing::{info, warn};

use crate::error::{BotError, BotResult, ValidationError, WebhookError};
use crate::orchestrator::{IgnoreReason, Orchestrator, RunOutcome};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// One inbound webhook delivery.
#[derive(Debug, Clone, Default)]
pub struct WebhookDelivery {
    /// `X-GitHub-Event`
    pub event: Option<String>,
    /// `X-GitHub-Delivery`
    pub delivery_id: Option<String>,
    /// `X-Hub-Signature` (`sha1=<hex>`)
    pub signature: Option<String>,
    /// `X-Hub-Signature-256` (`sha256=<hex>`)
    pub signature_256: Option<String>,
    pub body: Vec<u8>,
}

/// Signature algorithms accepted on deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1=",
            Self::Sha256 => "sha256=",
        }
    }
}

fn keyed_mac<M: Mac + KeyInit>(secret: &str, body: &[u8]) -> Option<M> {
    let mut mac = <M as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Computes the signature header value for `body`.
#[must_use]
pub fn sign(algorithm: SignatureAlgorithm, secret: &str, body: &[u8]) -> Option<String> {
    let digest = match algorithm {
        SignatureAlgorithm::Sha1 => keyed_mac::<HmacSha1>(secret, body)?
            .finalize()
            .into_bytes()
            .to_vec(),
        SignatureAlgorithm::Sha256 => keyed_mac::<HmacSha256>(secret, body)?
            .finalize()
            .into_bytes()
            .to_vec(),
    };
    Some(format!("{}{}", algorithm.prefix(), hex::encode(digest)))
}

fn verify_signature(
    algorithm: SignatureAlgorithm,
    secret: &str,
    header: &str,
    body: &[u8],
) -> Result<(), WebhookError> {
    let sig_hex = header.strip_prefix(algorithm.prefix()).ok_or_else(|| {
        WebhookError::MalformedSignature(format!("expected '{}' prefix", algorithm.prefix()))
    })?;
    let sig_bytes = hex::decode(sig_hex)
        .map_err(|e| WebhookError::MalformedSignature(format!("invalid hex: {e}")))?;

    // verify_slice compares in constant time
    let verified = match algorithm {
        SignatureAlgorithm::Sha1 => keyed_mac::<HmacSha1>(secret, body)
            .is_some_and(|mac| mac.verify_slice(&sig_bytes).is_ok()),
        SignatureAlgorithm::Sha256 => keyed_mac::<HmacSha256>(secret, body)
            .is_some_and(|mac| mac.verify_slice(&sig_bytes).is_ok()),
    };

    if verified {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Checks headers and signature of `delivery`.
///
/// `X-Hub-Signature-256` is preferred when both signatures are present.
///
/// # Errors
///
/// Returns the first failing check as a `WebhookError`.
pub fn verify(delivery: &WebhookDelivery, secret: Option<&str>) -> Result<(), WebhookError> {
    let secret = secret.ok_or(WebhookError::MissingSecret)?;

    let (algorithm, header) = match (&delivery.signature_256, &delivery.signature) {
        (Some(sig), _) => (SignatureAlgorithm::Sha256, sig),
        (None, Some(sig)) => (SignatureAlgorithm::Sha1, sig),
        (None, None) => return Err(WebhookError::MissingSignature),
    };
    if delivery.event.as_deref().is_none_or(str::is_empty) {
        return Err(WebhookError::MissingEvent);
    }
    if delivery.delivery_id.as_deref().is_none_or(str::is_empty) {
        return Err(WebhookError::MissingDelivery);
    }

    verify_signature(algorithm, secret, header, &delivery.body)
}

/// Status code and plain-text body returned to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Maps a delivery result to the response.
    #[must_use]
    pub fn from_result(result: &BotResult<RunOutcome>) -> Self {
        match result {
            Ok(RunOutcome::Ignored(IgnoreReason::UnsupportedEvent(_))) => Self::new(200, "Pong!"),
            Ok(RunOutcome::Ignored(IgnoreReason::OwnBranch(_))) => {
                Self::new(200, concat!("Created by ", env!("CARGO_PKG_NAME")))
            }
            Ok(RunOutcome::Completed { .. }) => Self::new(200, "Done!"),
            Err(BotError::Validation(e))
                if matches!(**e, ValidationError::MalformedPayload { .. }) =>
            {
                Self::new(400, "Invalid body")
            }
            Err(BotError::Webhook(e)) => Self::new(e.status_code(), e.to_string()),
            Err(e) => Self::new(400, e.to_string()),
        }
    }
}

impl From<WebhookError> for WebhookResponse {
    fn from(err: WebhookError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

/// Verifies deliveries and hands them to the orchestrator.
pub struct WebhookGate {
    secret: Option<String>,
    orchestrator: Orchestrator,
}

impl WebhookGate {
    pub fn new(secret: Option<String>, orchestrator: Orchestrator) -> Self {
        Self {
            secret,
            orchestrator,
        }
    }

    /// Processes one delivery end to end.
    pub async fn handle(&self, delivery: &WebhookDelivery) -> WebhookResponse {
        if let Err(e) = verify(delivery, self.secret.as_deref()) {
            warn!(error = %e, "rejected webhook delivery");
            return e.into();
        }

        let event = delivery.event.as_deref().unwrap_or_default();
        let delivery_id = delivery.delivery_id.as_deref().unwrap_or_default();
        info!(event, delivery = delivery_id, "webhook delivery accepted");

        let result = self.orchestrator.handle_delivery(event, &delivery.body).await;
        let response = WebhookResponse::from_result(&result);
        info!(status = response.status, "webhook delivery handled");
        response
    }
}

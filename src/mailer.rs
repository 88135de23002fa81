//! Plan Dispatcher — composes the plan email and delivers it over SMTP.
//!
//! The SMTP session is scoped to one send: connect, STARTTLS, authenticate,
//! submit, teardown. No pooled connection survives a request, on success or
//! failure. Delivery is not idempotent — dispatching twice sends twice.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::DispatchError;
use crate::generator::GeneratedPlan;

/// Subject line for every plan email.
const PLAN_SUBJECT: &str = "Your Personalized AI Fitness Plan";

/// An outbound plain-text email, built fresh per request.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail-transport seam.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

/// SMTP transport over lettre.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Blocking send — runs under spawn_blocking from the async seam.
    fn send_blocking(config: &SmtpConfig, message: &EmailMessage) -> Result<(), DispatchError> {
        let email = build_message(message)?;

        let creds = Credentials::new(
            config.sender.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| DispatchError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        transport
            .send(&email)
            .map_err(|e| DispatchError::Transport(format!("SMTP send failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let config = self.config.clone();
        let message = message.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(&config, &message))
            .await
            .map_err(|e| DispatchError::Transport(format!("send task failed: {e}")))?
    }
}

/// Build a lettre message from an `EmailMessage`.
fn build_message(message: &EmailMessage) -> Result<Message, DispatchError> {
    Message::builder()
        .from(message.from.parse().map_err(|e| {
            DispatchError::InvalidAddress(format!("from {}: {e}", message.from))
        })?)
        .to(message.to.parse().map_err(|e| {
            DispatchError::InvalidAddress(format!("to {}: {e}", message.to))
        })?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| DispatchError::BuildFailed(e.to_string()))
}

/// Plan Dispatcher — stage 3 of the pipeline. Fixed sender identity and
/// subject; recipient comes from the validated profile.
pub struct PlanDispatcher {
    from_address: String,
    transport: Arc<dyn MailTransport>,
}

impl PlanDispatcher {
    pub fn new(from_address: String, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            from_address,
            transport,
        }
    }

    /// Deliver a generated plan to the recipient. One attempt; a failed
    /// delivery discards the plan.
    pub async fn dispatch(
        &self,
        plan: &GeneratedPlan,
        recipient: &str,
    ) -> Result<(), DispatchError> {
        let message = EmailMessage {
            from: self.from_address.clone(),
            to: recipient.to_string(),
            subject: PLAN_SUBJECT.to_string(),
            body: plan.as_str().to_string(),
        };

        self.transport.send(&message).await?;
        info!(to = %recipient, "Fitness plan email sent");
        Ok(())
    }
}

pub mod templates;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Out-of-band delivery of one-time tokens.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_invite(
        &self,
        to_email: &str,
        tenant_name: &str,
        role: &str,
        accept_url: &str,
    ) -> Result<(), String>;

    async fn send_invite_reminder(
        &self,
        to_email: &str,
        tenant_name: &str,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), String>;

    async fn send_password_reset(&self, to_email: &str, reset_url: &str) -> Result<(), String>;
}

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SystemMailer {
    async fn send_invite(
        &self,
        to_email: &str,
        tenant_name: &str,
        role: &str,
        accept_url: &str,
    ) -> Result<(), String> {
        let html = templates::render_invite(tenant_name, role, accept_url)?;
        self.send(
            to_email,
            &format!("You've been invited to {tenant_name}"),
            &html,
        )
        .await
    }

    async fn send_invite_reminder(
        &self,
        to_email: &str,
        tenant_name: &str,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), String> {
        let html = templates::render_invite_reminder(tenant_name, role, expires_at)?;
        self.send(
            to_email,
            &format!("Reminder: your invitation to {tenant_name}"),
            &html,
        )
        .await
    }

    async fn send_password_reset(&self, to_email: &str, reset_url: &str) -> Result<(), String> {
        let html = templates::render_password_reset(reset_url)?;
        self.send(to_email, "Password Reset", &html).await
    }
}

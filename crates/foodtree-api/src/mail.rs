//! Outbound delivery for contact-form messages.
//!
//! With a [`MailConfig`] the message is posted as JSON to a transactional
//! email HTTP API. Without one it is only logged, which is what local
//! development and tests use.

use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

/// Transactional-email API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
  /// Endpoint accepting `POST` with a JSON message body.
  pub endpoint: String,
  #[serde(default)]
  pub api_key:  Option<String>,
  pub from:     String,
  pub to:       String,
}

/// A validated contact-form message.
#[derive(Debug, Clone)]
pub struct ContactMessage {
  pub name:    String,
  pub email:   String,
  pub subject: String,
  pub message: String,
}

pub struct Mailer {
  http: Option<(reqwest::Client, MailConfig)>,
}

impl Mailer {
  pub fn new(config: Option<MailConfig>) -> Self {
    Self {
      http: config.map(|c| (reqwest::Client::new(), c)),
    }
  }

  /// A mailer that logs messages instead of sending them.
  pub fn log_only() -> Self { Self { http: None } }

  pub async fn send(&self, msg: &ContactMessage) -> Result<(), ApiError> {
    let Some((client, config)) = &self.http else {
      tracing::info!(
        from = %msg.email,
        subject = %msg.subject,
        "mail delivery not configured; contact message logged only"
      );
      return Ok(());
    };

    let body = json!({
      "from": config.from,
      "to": config.to,
      "reply_to": format!("{} <{}>", msg.name, msg.email),
      "subject": format!("Contact Form: {}", msg.subject),
      "text": format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
        msg.name, msg.email, msg.subject, msg.message
      ),
    });

    let mut request = client.post(&config.endpoint).json(&body);
    if let Some(key) = &config.api_key {
      request = request.bearer_auth(key);
    }
    request
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| ApiError::Mail(e.to_string()))?;

    tracing::info!(from = %msg.email, "contact message sent");
    Ok(())
  }
}

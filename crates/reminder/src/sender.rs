//! Reminder transports.
//!
//! The agenda only hands off a [`ReminderRequest`]; the message itself is
//! written and delivered by whoever owns the webhook.

use std::{sync::Arc, time::Duration};

use agenda_core::{models::reminder::ReminderRequest, services::ReminderSender};
use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SenderConfig;

const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;

/// Link a patient follows to confirm or move an appointment.
pub fn reschedule_link(public_url: &str, token: &str) -> String {
    format!(
        "{}/reschedule?token={}",
        public_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

/// Body POSTed to the reminder webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub appointment_id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub phone: String,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub reschedule_url: Option<String>,
}

impl WebhookPayload {
    pub fn new(reminder: &ReminderRequest, public_url: Option<&str>) -> Self {
        let reschedule_url = match (public_url, reminder.reschedule_token.as_deref()) {
            (Some(base), Some(token)) => Some(reschedule_link(base, token)),
            _ => None,
        };
        Self {
            appointment_id: reminder.appointment_id,
            professional_id: reminder.professional_id,
            patient_id: reminder.patient_id,
            phone: reminder.phone.clone(),
            date: reminder.date,
            time: reminder.start.format("%H:%M").to_string(),
            reschedule_url,
        }
    }
}

pub struct WebhookSender {
    client: reqwest::Client,
    webhook_url: String,
    public_url: Option<String>,
}

impl WebhookSender {
    pub fn new(webhook_url: impl Into<String>, public_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .wrap_err("failed to build HTTP client")?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            public_url,
        })
    }
}

#[async_trait]
impl ReminderSender for WebhookSender {
    async fn send(&self, reminder: &ReminderRequest) -> Result<()> {
        let payload = WebhookPayload::new(reminder, self.public_url.as_deref());
        debug!("Posting reminder for appointment {}", payload.appointment_id);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(eyre!("Reminder webhook returned {}: {}", status, error_text));
        }
        Ok(())
    }
}

/// Used when no webhook is configured. Every reminder fails, so a sweep
/// reports them all as skipped.
pub struct DisabledSender;

#[async_trait]
impl ReminderSender for DisabledSender {
    async fn send(&self, reminder: &ReminderRequest) -> Result<()> {
        Err(eyre!(
            "no reminder webhook configured, appointment {} not notified",
            reminder.appointment_id
        ))
    }
}

/// Picks the transport described by `config`.
pub fn build_sender(config: &SenderConfig) -> Result<Arc<dyn ReminderSender>> {
    match &config.webhook_url {
        Some(url) => {
            info!("Reminders go to webhook {}", url);
            Ok(Arc::new(WebhookSender::new(url.clone(), config.public_url.clone())?))
        }
        None => {
            info!("REMINDER_WEBHOOK_URL not set, reminders are disabled");
            Ok(Arc::new(DisabledSender))
        }
    }
}

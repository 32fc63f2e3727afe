//! Mock notifier for testing

use async_trait::async_trait;
use std::sync::Mutex;
use timeclerk_util::{Result, TimeclerkError};

use crate::Notifier;

/// One captured outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// Mock notifier that records sends
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<SentMessage>>,

    /// Configure sends to fail
    pub fail_send: Mutex<bool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to_e164: &str, body: &str) -> Result<()> {
        if *self.fail_send.lock().unwrap() {
            return Err(TimeclerkError::notify("mock send failure"));
        }
        self.sent.lock().unwrap().push(SentMessage {
            to: to_e164.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends() {
        let notifier = MockNotifier::new();
        notifier.send("+15551234567", "hello").await.unwrap();
        assert_eq!(notifier.sent_count(), 1);
        assert_eq!(notifier.sent()[0].to, "+15551234567");
    }

    #[tokio::test]
    async fn failure_injection() {
        let notifier = MockNotifier::new();
        *notifier.fail_send.lock().unwrap() = true;
        assert!(notifier.send("+15551234567", "hello").await.is_err());
        assert_eq!(notifier.sent_count(), 0);
    }
}

//! Outbound SMS dispatch
//!
//! Thin wrapper over the SMS gateway's REST API, plus the reminder
//! message template. Fire-and-forget from the engine's perspective:
//! a send either succeeds or reports a [`TimeclerkError::Notify`].

mod gateway;
mod mock;

pub use gateway::*;
pub use mock::*;

use async_trait::async_trait;
use timeclerk_util::Result;

/// The message-sending capability the engine consumes
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to an E.164 number.
    async fn send(&self, to_e164: &str, body: &str) -> Result<()>;
}

/// Reminder message for an open shift.
pub fn reminder_body(member_name: &str, clock_out_link: &str) -> String {
    format!(
        "Hi {} - reminder to clock out. Tap here: {}",
        member_name, clock_out_link
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_body_embeds_name_and_link() {
        let body = reminder_body("Pat", "https://kiosk.example.org/api/clock-out?token=abc");
        assert_eq!(
            body,
            "Hi Pat - reminder to clock out. Tap here: \
             https://kiosk.example.org/api/clock-out?token=abc"
        );
    }
}

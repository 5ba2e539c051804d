use serde::{Deserialize, Serialize};

/// Shown when the wake probe could not reach the service.
pub const WAKE_APOLOGY: &str =
    "Sorry, the identification service is not responding right now. Please try again later.";

/// Reply to the health GET. The hosted service answers with `message`, older builds with `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeReply {
    #[serde(alias = "message")]
    pub status: String,
}

/// Outcome of the most recent wake probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub awake: bool,
    pub probing: bool,
    pub message: String,
}

impl BackendStatus {
    pub fn asleep() -> Self {
        Self {
            awake: false,
            probing: false,
            message: String::new(),
        }
    }

    pub fn probing() -> Self {
        Self {
            awake: false,
            probing: true,
            message: "Waking up the server...".into(),
        }
    }

    pub fn from_reply(reply: WakeReply) -> Self {
        Self {
            awake: true,
            probing: false,
            message: reply.status,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            awake: false,
            probing: false,
            message: WAKE_APOLOGY.into(),
        }
    }
}

impl Default for BackendStatus {
    fn default() -> Self {
        Self::asleep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_reply_accepts_message_field() {
        let reply: WakeReply = serde_json::from_str(r#"{"message":"Ready to process images."}"#).unwrap();
        assert_eq!(reply.status, "Ready to process images.");
        let reply: WakeReply = serde_json::from_str(r#"{"status":"awake"}"#).unwrap();
        assert_eq!(BackendStatus::from_reply(reply).message, "awake");
    }

    #[test]
    fn unavailable_stays_asleep() {
        let status = BackendStatus::unavailable();
        assert!(!status.awake);
        assert_eq!(status.message, WAKE_APOLOGY);
    }
}

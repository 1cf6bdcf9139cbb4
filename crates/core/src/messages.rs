//! Queue message schemas.
//!
//! Both queues carry JSON bodies. Delivery is at-least-once, so every
//! consumer must tolerate duplicates.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Start signal: tells the dispatcher to resolve and fan out one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobMessage {
    pub job_id: JobId,
}

/// Fan-out message: one independent work unit for one worker invocation.
/// No unit identity is tracked beyond the name carried here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessUnitMessage {
    pub job_id: JobId,
    pub unit_name: String,
    pub derived_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_unit_message_round_trips() {
        let msg = ProcessUnitMessage {
            job_id: "abc".into(),
            unit_name: "De Bilt".into(),
            derived_value: "12.3".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ProcessUnitMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.unit_name, "De Bilt");
        assert_eq!(back.derived_value, "12.3");
    }

    #[test]
    fn unknown_body_fails_to_parse() {
        assert!(serde_json::from_str::<StartJobMessage>("{\"nope\": 1}").is_err());
    }
}

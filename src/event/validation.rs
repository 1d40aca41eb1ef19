use super::{AgentId, TickMessage};
use serde_json::Value;
use std::fmt;

/// Reasons a stream payload cannot be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    InvalidJson(String),
    NotAnObject,
    MissingAgent(&'static str),
    InvalidSnapshot { agent: &'static str, reason: String },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::InvalidJson(reason) => write!(f, "payload is not valid JSON: {}", reason),
            PayloadError::NotAnObject => write!(f, "payload must be a JSON object"),
            PayloadError::MissingAgent(key) => write!(f, "payload is missing agent '{}'", key),
            PayloadError::InvalidSnapshot { agent, reason } => {
                write!(f, "invalid snapshot for agent '{}': {}", agent, reason)
            }
        }
    }
}

impl std::error::Error for PayloadError {}

/// Parses one stream payload into a [`TickMessage`].
///
/// Both agents must be present and well-formed; a message is either applied
/// whole or rejected whole.
pub fn parse_message(data: &str) -> Result<TickMessage, PayloadError> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(PayloadError::NotAnObject)?;

    for agent in AgentId::ALL {
        let snapshot = object
            .get(agent.key())
            .ok_or(PayloadError::MissingAgent(agent.key()))?;
        if let Err(e) = serde_json::from_value::<super::TickSnapshot>(snapshot.clone()) {
            return Err(PayloadError::InvalidSnapshot {
                agent: agent.key(),
                reason: e.to_string(),
            });
        }
    }

    // Both snapshots were checked above
    serde_json::from_value(value).map_err(|e| PayloadError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_missing_agent_is_reported_by_key() {
        let err = parse_message(r#"{"gpt35": {}}"#).unwrap_err();
        // gpt35 is checked first and is itself malformed
        assert!(matches!(err, PayloadError::InvalidSnapshot { agent: "gpt35", .. }));

        let err = parse_message(r#"{"gpt4": {}}"#).unwrap_err();
        assert_eq!(err, PayloadError::MissingAgent("gpt35"));
    }

    #[test]
    fn test_non_object_payloads() {
        assert_eq!(parse_message("[]").unwrap_err(), PayloadError::NotAnObject);
        assert_eq!(parse_message("42").unwrap_err(), PayloadError::NotAnObject);
        assert!(matches!(
            parse_message("{not json").unwrap_err(),
            PayloadError::InvalidJson(_)
        ));
    }
}

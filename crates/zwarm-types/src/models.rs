use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mission lifecycle state, stored in the database as its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    Open,
    InProgress,
    Completed,
    Archived,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Open => "OPEN",
            MissionStatus::InProgress => "IN_PROGRESS",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(MissionStatus::Open),
            "IN_PROGRESS" => Some(MissionStatus::InProgress),
            "COMPLETED" => Some(MissionStatus::Completed),
            "ARCHIVED" => Some(MissionStatus::Archived),
            _ => None,
        }
    }
}

impl Default for MissionStatus {
    fn default() -> Self {
        MissionStatus::Open
    }
}

/// Compact user reference embedded in mission/task/comment/resource payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub emoji: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_wire_names() {
        for status in [
            MissionStatus::Open,
            MissionStatus::InProgress,
            MissionStatus::Completed,
            MissionStatus::Archived,
        ] {
            assert_eq!(MissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MissionStatus::parse("DONE"), None);
    }
}

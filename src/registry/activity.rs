// Activity record
// One extracurricular offering and its roster

use serde::{Deserialize, Serialize};

/// A single activity as held by the registry and returned by `GET /activities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    /// Advertised capacity. Only checked on signup when capacity enforcement is on.
    pub max_participants: u32,
    /// Emails in signup order, no duplicates
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    pub fn new(description: &str, schedule: &str, max_participants: u32) -> Self {
        Self {
            description: description.to_string(),
            schedule: schedule.to_string(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Builder-style helper used by the seed set and tests
    #[must_use]
    pub fn with_participants(mut self, emails: &[&str]) -> Self {
        for email in emails {
            if !self.is_enrolled(email) {
                self.participants.push((*email).to_string());
            }
        }
        self
    }

    pub fn is_enrolled(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_participants_skips_duplicates() {
        let activity = Activity::new("Chess", "Fridays", 4)
            .with_participants(&["a@x.com", "b@x.com", "a@x.com"]);
        assert_eq!(activity.participants, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_is_full() {
        let activity = Activity::new("Chess", "Fridays", 2).with_participants(&["a@x.com"]);
        assert!(!activity.is_full());

        let activity = activity.with_participants(&["b@x.com", "c@x.com"]);
        assert!(activity.is_full());
    }

    #[test]
    fn test_serialized_shape() {
        let activity = Activity::new("Chess", "Fridays", 12).with_participants(&["a@x.com"]);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["description"], "Chess");
        assert_eq!(value["schedule"], "Fridays");
        assert_eq!(value["max_participants"], 12);
        assert!(value["participants"].is_array());
    }
}

//! Activity registry module
//!
//! In-memory catalog of activities and their rosters. The registry is a plain
//! owned value; `AppState` wraps it in a lock for concurrent request handling.

mod activity;
mod error;
mod seed;

use std::collections::BTreeMap;

pub use activity::Activity;
pub use error::RegistryError;
pub use seed::default_activities;

/// Activity name -> activity, ordered by name so listings are stable
pub type ActivityMap = BTreeMap<String, Activity>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRegistry {
    activities: ActivityMap,
    enforce_capacity: bool,
}

impl ActivityRegistry {
    /// Build a registry from `(name, activity)` pairs.
    ///
    /// Duplicate emails inside a seeded roster are dropped (first one wins) and a
    /// later entry with an already-seen name replaces the earlier one.
    pub fn new(activities: impl IntoIterator<Item = (String, Activity)>) -> Self {
        let activities = activities
            .into_iter()
            .map(|(name, mut activity)| {
                let mut seen = Vec::with_capacity(activity.participants.len());
                activity.participants.retain(|email| {
                    if seen.contains(email) {
                        false
                    } else {
                        seen.push(email.clone());
                        true
                    }
                });
                (name, activity)
            })
            .collect();

        Self {
            activities,
            enforce_capacity: false,
        }
    }

    /// Reject signups once `max_participants` is reached. Off by default.
    #[must_use]
    pub const fn with_capacity_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_capacity = enforce;
        self
    }

    pub const fn enforces_capacity(&self) -> bool {
        self.enforce_capacity
    }

    /// Snapshot of every activity and its roster
    pub fn list_activities(&self) -> ActivityMap {
        self.activities.clone()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Add `email` to the end of the activity's roster
    pub fn signup(&mut self, activity_name: &str, email: &str) -> Result<String, RegistryError> {
        let enforce_capacity = self.enforce_capacity;
        let activity = self.lookup_mut(activity_name)?;

        if activity.is_enrolled(email) {
            return Err(RegistryError::AlreadySignedUp {
                activity: activity_name.to_string(),
                email: email.to_string(),
            });
        }

        if enforce_capacity && activity.is_full() {
            return Err(RegistryError::ActivityFull {
                activity: activity_name.to_string(),
                capacity: activity.max_participants,
            });
        }

        activity.participants.push(email.to_string());
        Ok(format!("Signed up {email} for {activity_name}"))
    }

    /// Remove `email` from the activity's roster, keeping the others in order
    pub fn unregister(&mut self, activity_name: &str, email: &str) -> Result<String, RegistryError> {
        let activity = self.lookup_mut(activity_name)?;

        let Some(position) = activity.participants.iter().position(|p| p == email) else {
            return Err(RegistryError::NotSignedUp {
                activity: activity_name.to_string(),
                email: email.to_string(),
            });
        };

        activity.participants.remove(position);
        Ok(format!("Unregistered {email} from {activity_name}"))
    }

    fn lookup_mut(&mut self, activity_name: &str) -> Result<&mut Activity, RegistryError> {
        self.activities
            .get_mut(activity_name)
            .ok_or_else(|| RegistryError::NotFound {
                activity: activity_name.to_string(),
            })
    }
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new(default_activities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(registry: &ActivityRegistry, name: &str) -> Vec<String> {
        registry.list_activities()[name].participants.clone()
    }

    #[test]
    fn test_seed_contains_known_activities() {
        let activities = ActivityRegistry::default().list_activities();
        assert!(activities.contains_key("Chess Club"));
        assert!(activities.contains_key("Programming Class"));
    }

    #[test]
    fn test_unknown_activity_is_not_found() {
        let mut registry = ActivityRegistry::default();
        for name in ["FakeActivity", "chess club", "Chess Club ", ""] {
            assert!(matches!(
                registry.signup(name, "a@x.com"),
                Err(RegistryError::NotFound { .. })
            ));
            assert!(matches!(
                registry.unregister(name, "a@x.com"),
                Err(RegistryError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_signup_unregister_scenario() {
        let mut registry = ActivityRegistry::default();

        let message = registry.signup("Chess Club", "a@x.com").unwrap();
        assert_eq!(message, "Signed up a@x.com for Chess Club");
        assert!(roster(&registry, "Chess Club").contains(&"a@x.com".to_string()));

        let err = registry.signup("Chess Club", "a@x.com").unwrap_err();
        assert!(err.detail().contains("already signed up"));
        let count = roster(&registry, "Chess Club")
            .iter()
            .filter(|p| *p == "a@x.com")
            .count();
        assert_eq!(count, 1);

        let message = registry.unregister("Chess Club", "a@x.com").unwrap();
        assert!(message.starts_with("Unregistered"));
        assert!(!roster(&registry, "Chess Club").contains(&"a@x.com".to_string()));

        let err = registry.unregister("Chess Club", "a@x.com").unwrap_err();
        assert!(err.detail().contains("not signed up"));

        assert!(matches!(
            registry.signup("FakeActivity", "a@x.com"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_failed_operations_change_nothing() {
        let mut registry = ActivityRegistry::default();
        registry.signup("Chess Club", "a@x.com").unwrap();
        let before = registry.list_activities();

        let _ = registry.signup("Chess Club", "a@x.com");
        let _ = registry.unregister("Chess Club", "nobody@x.com");
        let _ = registry.signup("FakeActivity", "a@x.com");

        assert_eq!(registry.list_activities(), before);
    }

    #[test]
    fn test_list_is_idempotent() {
        let registry = ActivityRegistry::default();
        assert_eq!(registry.list_activities(), registry.list_activities());
    }

    #[test]
    fn test_signup_preserves_existing_order() {
        let mut registry = ActivityRegistry::default();
        let initial = roster(&registry, "Chess Club");

        registry.signup("Chess Club", "new@x.com").unwrap();

        let after = roster(&registry, "Chess Club");
        assert_eq!(&after[..initial.len()], initial.as_slice());
        assert_eq!(after.last().map(String::as_str), Some("new@x.com"));
    }

    #[test]
    fn test_unregister_keeps_relative_order() {
        let mut registry = ActivityRegistry::new([(
            "Chess Club".to_string(),
            Activity::new("Chess", "Fridays", 10).with_participants(&["a@x", "b@x", "c@x"]),
        )]);

        registry.unregister("Chess Club", "b@x").unwrap();
        assert_eq!(roster(&registry, "Chess Club"), vec!["a@x", "c@x"]);
    }

    #[test]
    fn test_same_email_across_activities_is_independent() {
        let mut registry = ActivityRegistry::default();
        let email = "multi@x.com";

        registry.signup("Chess Club", email).unwrap();
        registry.signup("Programming Class", email).unwrap();
        assert!(roster(&registry, "Chess Club").contains(&email.to_string()));
        assert!(roster(&registry, "Programming Class").contains(&email.to_string()));

        registry.unregister("Chess Club", email).unwrap();
        assert!(!roster(&registry, "Chess Club").contains(&email.to_string()));
        assert!(roster(&registry, "Programming Class").contains(&email.to_string()));
    }

    #[test]
    fn test_signup_again_after_unregister() {
        let mut registry = ActivityRegistry::default();
        registry.signup("Programming Class", "i@x.com").unwrap();
        registry.unregister("Programming Class", "i@x.com").unwrap();
        assert!(registry.signup("Programming Class", "i@x.com").is_ok());
    }

    #[test]
    fn test_capacity_not_enforced_by_default() {
        let mut registry = ActivityRegistry::new([(
            "Tiny".to_string(),
            Activity::new("Tiny", "Never", 1).with_participants(&["a@x"]),
        )]);

        assert!(registry.signup("Tiny", "b@x").is_ok());
        assert_eq!(roster(&registry, "Tiny").len(), 2);
    }

    #[test]
    fn test_capacity_enforced_when_enabled() {
        let mut registry = ActivityRegistry::new([(
            "Tiny".to_string(),
            Activity::new("Tiny", "Never", 1).with_participants(&["a@x"]),
        )])
        .with_capacity_enforcement(true);

        assert_eq!(
            registry.signup("Tiny", "b@x"),
            Err(RegistryError::ActivityFull {
                activity: "Tiny".to_string(),
                capacity: 1,
            })
        );
        // duplicate check still wins over the capacity check
        assert!(matches!(
            registry.signup("Tiny", "a@x"),
            Err(RegistryError::AlreadySignedUp { .. })
        ));
    }

    #[test]
    fn test_new_dedupes_seeded_rosters() {
        let mut activity = Activity::new("Chess", "Fridays", 10);
        activity.participants = vec!["a@x".into(), "b@x".into(), "a@x".into()];

        let registry = ActivityRegistry::new([("Chess Club".to_string(), activity)]);
        assert_eq!(roster(&registry, "Chess Club"), vec!["a@x", "b@x"]);
    }
}

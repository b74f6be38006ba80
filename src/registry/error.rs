use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Activity not found: {activity}")]
    NotFound { activity: String },
    #[error("{email} already signed up for {activity}")]
    AlreadySignedUp { activity: String, email: String },
    #[error("{email} is not signed up for {activity}")]
    NotSignedUp { activity: String, email: String },
    #[error("{activity} is full ({capacity} participants)")]
    ActivityFull { activity: String, capacity: u32 },
}

impl RegistryError {
    /// HTTP status the error maps to: 404 for unknown activities, 400 otherwise
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadySignedUp { .. } | Self::NotSignedUp { .. } | Self::ActivityFull { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Client-facing `detail` string
    pub fn detail(&self) -> String {
        match self {
            Self::NotFound { .. } => "Activity not found".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = RegistryError::NotFound {
            activity: "FakeActivity".to_string(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.detail(), "Activity not found");

        let duplicate = RegistryError::AlreadySignedUp {
            activity: "Chess Club".to_string(),
            email: "a@x.com".to_string(),
        };
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
        assert!(duplicate.detail().contains("already signed up"));

        let absent = RegistryError::NotSignedUp {
            activity: "Chess Club".to_string(),
            email: "a@x.com".to_string(),
        };
        assert_eq!(absent.status(), StatusCode::BAD_REQUEST);
        assert!(absent.detail().contains("not signed up"));
    }
}

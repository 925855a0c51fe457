use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Payment status vocabulary the order system understands, decoupled from
/// any one processor's strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    Completed,
    Pending,
    Cancelled,
    Failed,
    Refunded,
}

impl CanonicalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Maps a provider status string to its canonical counterpart.
    ///
    /// The table is exact and case-sensitive, as the processor sends it.
    /// Anything unrecognized maps to `Pending`: an unknown status must not
    /// be treated as success, nor as an irrecoverable failure.
    pub fn from_provider(provider_status: &str) -> Self {
        match provider_status {
            "Completed" => Self::Completed,
            "Pending" => Self::Pending,
            "Cancelled" => Self::Cancelled,
            "Failed" | "Denied" => Self::Failed,
            "Refunded" | "Reversed" => Self::Refunded,
            other => {
                tracing::warn!(provider_status = other, "unknown provider status, defaulting to pending");
                Self::Pending
            }
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_fixed_table() {
        assert_eq!(CanonicalStatus::from_provider("Completed"), CanonicalStatus::Completed);
        assert_eq!(CanonicalStatus::from_provider("Pending"), CanonicalStatus::Pending);
        assert_eq!(CanonicalStatus::from_provider("Cancelled"), CanonicalStatus::Cancelled);
        assert_eq!(CanonicalStatus::from_provider("Failed"), CanonicalStatus::Failed);
        assert_eq!(CanonicalStatus::from_provider("Denied"), CanonicalStatus::Failed);
        assert_eq!(CanonicalStatus::from_provider("Refunded"), CanonicalStatus::Refunded);
        assert_eq!(CanonicalStatus::from_provider("Reversed"), CanonicalStatus::Refunded);
    }

    #[test]
    fn mapping_is_case_sensitive() {
        // Lowercase variants are not in the table and fall to the default.
        assert_eq!(CanonicalStatus::from_provider("completed"), CanonicalStatus::Pending);
        assert_eq!(CanonicalStatus::from_provider("COMPLETED"), CanonicalStatus::Pending);
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        assert_eq!(CanonicalStatus::from_provider("In-Progress"), CanonicalStatus::Pending);
        assert_eq!(CanonicalStatus::from_provider(""), CanonicalStatus::Pending);
    }
}

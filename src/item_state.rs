use std::fmt;

use serde::{Deserialize, Serialize};

/// Availability of a catalog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    /// Item can be borrowed
    #[default]
    Available,
    /// Item is out on an active loan
    Borrowed,
    /// E-magazine issue withdrawn from circulation for good
    Archived,
}

impl AvailabilityStatus {
    /// Get a human-readable description of the status
    #[must_use]
    pub fn get_description(self) -> &'static str {
        match self {
            Self::Available => "Item is available for borrowing",
            Self::Borrowed => "Item is out on loan",
            Self::Archived => "Item is archived and can no longer be borrowed",
        }
    }

    /// Label used in item status lines
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Borrowed => "BORROWED",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

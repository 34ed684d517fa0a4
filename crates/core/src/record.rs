//! The ownable record hierarchy.
//!
//! ```text
//! exhibit
//! ├── heading
//! ├── item
//! ├── grid ──── grid_item
//! └── timeline ── timeline_item
//! ```

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Tag identifying which level of the hierarchy an authorization check targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Exhibit,
    Item,
    Heading,
    Grid,
    GridItem,
    Timeline,
    TimelineItem,
}

impl RecordType {
    pub const ALL: [RecordType; 7] = [
        RecordType::Exhibit,
        RecordType::Item,
        RecordType::Heading,
        RecordType::Grid,
        RecordType::GridItem,
        RecordType::Timeline,
        RecordType::TimelineItem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Exhibit => "exhibit",
            RecordType::Item => "item",
            RecordType::Heading => "heading",
            RecordType::Grid => "grid",
            RecordType::GridItem => "grid_item",
            RecordType::Timeline => "timeline",
            RecordType::TimelineItem => "timeline_item",
        }
    }

    /// Whether records of this type live under a parent exhibit.
    pub fn is_child(&self) -> bool {
        !matches!(self, RecordType::Exhibit)
    }
}

impl FromStr for RecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::unknown_record_type(s))
    }
}

impl core::fmt::Display for RecordType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

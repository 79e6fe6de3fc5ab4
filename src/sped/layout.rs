//! Versioned periodic-report layouts.
//!
//! The authority revises the file layout periodically; record codes and
//! field widths belong to the layout, not to the generator, so a new
//! layout version is a data change rather than a code change.

use serde::{Deserialize, Serialize};

/// A versioned record layout for the periodic report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Layout version identifier embedded in the opening record.
    pub version: String,
    /// Record type code of the opening record (line 1).
    pub opening_code: String,
    /// Record type code of each body record.
    pub body_code: String,
    /// Record type code of the closing record (last line).
    pub closing_code: String,
    /// Width of the zero-padded body count field in the closing record.
    pub count_width: usize,
}

impl ReportLayout {
    /// The current layout revision.
    pub fn v1() -> Self {
        Self {
            version: "001".into(),
            opening_code: "9000".into(),
            body_code: "9010".into(),
            closing_code: "9990".into(),
            count_width: 6,
        }
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::v1()
    }
}

// src/services/clock.rs
// DOCUMENTATION: Local wall-clock timestamps
// PURPOSE: Every stored timestamp uses the configured UTC offset and one format

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Format of every timestamp written to the database
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts UTC instants into local wall-clock strings
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    /// Clock for a whole-hour offset; out-of-range offsets fall back to UTC
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| {
            log::warn!("Invalid UTC offset {}h, falling back to UTC", utc_offset_hours);
            Utc.fix()
        });
        Self { offset }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Current local time as `YYYY-mm-dd HH:MM:SS`
    pub fn now_string(&self) -> String {
        self.format(Utc::now())
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

impl Default for LocalClock {
    /// Beijing time (UTC+8)
    fn default() -> Self {
        Self::new(8)
    }
}

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

const KST_OFFSET_SECS: i32 = 9 * 3600;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UsageEvent {
    View,
    Search,
    Detail,
    Reload,
}

/// One row of the usage log sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub event: UsageEvent,
    pub query: Option<String>,
    pub result_count: Option<usize>,
    pub subject: Option<String>,
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

impl LogEntry {
    /// Timestamped in Korea Standard Time.
    pub fn now(event: UsageEvent) -> Self {
        Self::at(Utc::now().with_timezone(&kst()), event)
    }

    pub fn at(timestamp: DateTime<FixedOffset>, event: UsageEvent) -> Self {
        LogEntry {
            timestamp,
            event,
            query: None,
            result_count: None,
            subject: None,
        }
    }

    /// Blank queries are not recorded.
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = Some(count);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Cells in sheet column order: timestamp, event, query, result count, subject.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.event.to_string(),
            self.query.clone().unwrap_or_default(),
            self.result_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
            self.subject.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_to_cells() {
        let entry = LogEntry::at(fixed_time(), UsageEvent::Search)
            .with_query("  현대 ")
            .with_result_count(12);
        assert_eq!(
            entry.to_cells(),
            ["2024-03-01 09:30:00", "search", "현대", "12", ""]
        );
    }

    #[test]
    fn test_blank_query_is_dropped() {
        let entry = LogEntry::at(fixed_time(), UsageEvent::View).with_query("   ");
        assert_eq!(entry.query, None);
    }

    #[test]
    fn test_detail_subject() {
        let entry = LogEntry::at(fixed_time(), UsageEvent::Detail).with_subject("1구역 / 현대");
        assert_eq!(entry.to_cells()[1], "detail");
        assert_eq!(entry.to_cells()[4], "1구역 / 현대");
    }

    #[test]
    fn test_now_is_kst() {
        let entry = LogEntry::now(UsageEvent::Reload);
        assert_eq!(entry.timestamp.offset().local_minus_utc(), KST_OFFSET_SECS);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(UsageEvent::from_str("reload").unwrap(), UsageEvent::Reload);
        assert_eq!(UsageEvent::View.to_string(), "view");
    }
}

//! Alarm-setting utterance parsing.
//!
//! Extracts an hour/minute (separators "giờ", "h", ":"), applies the
//! 12-hour day-part qualifiers, and resolves relative or explicit dates.
//! Parsing is best-effort over free text: the first recognizable time
//! expression wins.

use super::VoiceParseError;
use crate::alarms::store::AlarmStore;
use crate::alarms::types::AlarmSpec;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Structured result of a parsed alarm-setting utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRequest {
    /// Firing time (24-hour)
    pub time: NaiveTime,
    /// Specific date; `None` means a daily alarm
    pub date: Option<NaiveDate>,
    /// Generated display name, unique among existing alarms
    pub name: String,
}

impl AlarmRequest {
    /// Convert into an alarm creation spec.
    pub fn into_spec(self) -> AlarmSpec {
        let mut spec = AlarmSpec::at(self.time).named(self.name);
        spec.date = self.date;
        spec
    }
}

/// Regex patterns for utterance parsing.
fn patterns() -> &'static UtterancePatterns {
    static PATTERNS: OnceLock<UtterancePatterns> = OnceLock::new();
    PATTERNS.get_or_init(UtterancePatterns::new)
}

struct UtterancePatterns {
    // "7 giờ 30", "7h30", "19:05", "9 giờ"
    time: Regex,
    // "ngày 15", "ngày 15 tháng 3", "ngày 15 tháng 3 năm 2027"
    explicit_date: Regex,
    // "ngày mai", standalone "mai", "tomorrow"
    tomorrow: Regex,
    // "hôm nay", "today"
    today: Regex,
}

impl UtterancePatterns {
    fn new() -> Self {
        Self {
            time: Regex::new(r"(\d{1,2})\s*(?:giờ|h|:)\s*(\d{1,2})?\s*(?:phút)?").unwrap(),
            explicit_date: Regex::new(
                r"ngày\s+(\d{1,2})(?:\s+tháng\s+(\d{1,2}))?(?:\s+năm\s+(\d{4}))?",
            )
            .unwrap(),
            tomorrow: Regex::new(r"ngày mai|\bmai\b|\btomorrow\b").unwrap(),
            today: Regex::new(r"hôm nay|\btoday\b").unwrap(),
        }
    }
}

/// Parses alarm-setting utterances into creation requests.
pub struct VoiceCommandParser;

impl VoiceCommandParser {
    /// Parse an utterance against today's date.
    ///
    /// `today` anchors relative words and fills the omitted parts of an
    /// explicit date; the store is consulted only to pick a free name.
    pub fn parse(
        utterance: &str,
        store: &AlarmStore,
        today: NaiveDate,
    ) -> Result<AlarmRequest, VoiceParseError> {
        let lowered = utterance.to_lowercase();

        let (hour, minute) = Self::extract_time(&lowered)?;
        let date = Self::extract_date(&lowered, today)?;

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(VoiceParseError::TimeNotRecognized)?;

        Ok(AlarmRequest {
            time,
            date,
            name: store.next_default_name(),
        })
    }

    /// Extract the hour and minute, applying day-part qualifiers.
    fn extract_time(lowered: &str) -> Result<(u32, u32), VoiceParseError> {
        let caps = patterns()
            .time
            .captures(lowered)
            .ok_or(VoiceParseError::TimeNotRecognized)?;

        let mut hour: u32 = caps[1]
            .parse()
            .map_err(|_| VoiceParseError::TimeNotRecognized)?;
        let minute: u32 = caps
            .get(2)
            .map(|m| m.as_str().parse())
            .transpose()
            .map_err(|_| VoiceParseError::TimeNotRecognized)?
            .unwrap_or(0);

        // Day-part qualifiers use standard 12-hour conversion.
        if lowered.contains("sáng") {
            if hour == 12 {
                hour = 0;
            }
        } else if (lowered.contains("chiều") || lowered.contains("tối")) && hour < 12 {
            hour += 12;
        }

        if hour > 23 || minute > 59 {
            return Err(VoiceParseError::TimeNotRecognized);
        }

        Ok((hour, minute))
    }

    /// Extract a specific date, if the utterance names one.
    fn extract_date(
        lowered: &str,
        today: NaiveDate,
    ) -> Result<Option<NaiveDate>, VoiceParseError> {
        if let Some(caps) = patterns().explicit_date.captures(lowered) {
            let day: u32 = caps[1]
                .parse()
                .map_err(|_| VoiceParseError::InvalidDate(caps[1].to_string()))?;
            let month: u32 = match caps.get(2) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VoiceParseError::InvalidDate(m.as_str().to_string()))?,
                None => today.month(),
            };
            let year: i32 = match caps.get(3) {
                Some(y) => y
                    .as_str()
                    .parse()
                    .map_err(|_| VoiceParseError::InvalidDate(y.as_str().to_string()))?,
                None => today.year(),
            };

            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                VoiceParseError::InvalidDate(format!("{day:02}/{month:02}/{year}"))
            })?;
            return Ok(Some(date));
        }

        if patterns().tomorrow.is_match(lowered) {
            return Ok(Some(today + Duration::days(1)));
        }
        if patterns().today.is_match(lowered) {
            return Ok(Some(today));
        }

        Ok(None)
    }
}

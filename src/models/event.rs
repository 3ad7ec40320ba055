use super::event_kind::EventKind;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

/// One predicted tidal, current or astronomical event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideEvent {
    pub location: String,              // ⇔ tide_events.location
    pub timestamp: DateTime<FixedOffset>, // ⇔ tide_events.epoch + timestamp (RFC 3339)
    pub zone: String,                  // ⇔ tide_events.zone ("PDT", "+0100", ...)
    pub kind: EventKind,               // ⇔ tide_events.kind + label
    pub level_text: String,            // ⇔ tide_events.level_text ("6.34 feet", may be empty)
    pub raw_line: String,              // ⇔ tide_events.raw_line
}

/// Unit of a parsed level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LevelUnit {
    Feet,
    Meters,
    Knots,
    Other(String),
}

/// Numeric reading of `level_text`, when it has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub value: f64,
    pub unit: LevelUnit,
}

impl TideEvent {
    pub fn new(
        location: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        zone: impl Into<String>,
        kind: EventKind,
        level_text: impl Into<String>,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            timestamp,
            zone: zone.into(),
            kind,
            level_text: level_text.into(),
            raw_line: raw_line.into(),
        }
    }

    /// Seconds since the epoch; the store orders and keys on this.
    pub fn epoch(&self) -> i64 {
        self.timestamp.timestamp()
    }

    pub fn date_str(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    pub fn time_str(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    /// Best-effort numeric reading of the level ("6.34 feet" → 6.34 ft).
    pub fn level(&self) -> Option<Level> {
        let mut parts = self.level_text.split_whitespace();
        let value: f64 = parts.next()?.parse().ok()?;
        let unit = match parts.next()? {
            "ft" | "feet" | "foot" => LevelUnit::Feet,
            "m" | "meters" | "metres" | "meter" => LevelUnit::Meters,
            "kt" | "kts" | "knots" | "knot" => LevelUnit::Knots,
            other => LevelUnit::Other(other.to_string()),
        };
        Some(Level { value, unit })
    }
}

impl fmt::Display for TideEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:<13} {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.zone,
            self.kind.label(),
            self.level_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(level: &str) -> TideEvent {
        let ts = DateTime::parse_from_rfc3339("2024-07-11T04:03:00-07:00").unwrap();
        TideEvent::new("Palo Alto", ts, "PDT", EventKind::HighTide, level, "")
    }

    #[test]
    fn level_parses_value_and_unit() {
        let lvl = event("6.34 feet").level().unwrap();
        assert_eq!(lvl.value, 6.34);
        assert_eq!(lvl.unit, LevelUnit::Feet);

        let lvl = event("-0.21 m").level().unwrap();
        assert_eq!(lvl.unit, LevelUnit::Meters);
    }

    #[test]
    fn level_is_optional() {
        assert!(event("").level().is_none());
        assert!(event("n/a").level().is_none());
    }

    #[test]
    fn display_uses_reported_zone() {
        let s = event("6.34 feet").to_string();
        assert!(s.starts_with("2024-07-11 04:03 PDT High Tide"));
        assert!(s.ends_with("6.34 feet"));
    }
}

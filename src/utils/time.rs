//! Time utilities: clock tokens and zone designators as printed by XTide.
//!
//! Every accepted format is listed explicitly; nothing here consults the
//! system locale or the local time zone database.

use chrono::{FixedOffset, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

/// Clock formats accepted after the date, tried in order.
const CLOCK_FORMATS: [&str; 4] = ["%I:%M %p", "%I:%M:%S %p", "%H:%M:%S", "%H:%M"];

static NUMERIC_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:UTC|GMT)?([+-])(\d{1,2})(?::?(\d{2}))?$").expect("valid offset regex")
});

/// Unambiguous zone abbreviations the tz database gives XTide stations,
/// with their UTC offset in minutes.
const ZONE_TABLE: &[(&str, i32)] = &[
    // Europe, Africa
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("WET", 0),
    ("WEST", 60),
    ("CET", 60),
    ("CEST", 120),
    ("WAT", 60),
    ("CAT", 120),
    ("SAST", 120),
    ("EET", 120),
    ("EEST", 180),
    ("EAT", 180),
    ("MSK", 180),
    // Asia, Oceania
    ("PKT", 300),
    ("NPT", 345),
    ("ICT", 420),
    ("WIB", 420),
    ("WITA", 480),
    ("WIT", 540),
    ("HKT", 480),
    ("SGT", 480),
    ("PHT", 480),
    ("AWST", 480),
    ("JST", 540),
    ("KST", 540),
    ("ACST", 570),
    ("ACDT", 630),
    ("AEST", 600),
    ("AEDT", 660),
    ("ChST", 600),
    ("NZST", 720),
    ("NZDT", 780),
    // Americas, Pacific
    ("HST", -600),
    ("HDT", -540),
    ("AKST", -540),
    ("AKDT", -480),
    ("PST", -480),
    ("PDT", -420),
    ("MST", -420),
    ("MDT", -360),
    ("EST", -300),
    ("EDT", -240),
    ("NST", -210),
    ("NDT", -150),
    ("ART", -180),
    ("BRT", -180),
    ("UYT", -180),
    ("PET", -300),
    ("COT", -300),
];

/// Abbreviations shared by zones with different offsets ("IST" is India,
/// Ireland and Israel; "CST" is US Central, China and Cuba). Lines using
/// them are rejected rather than given a guessed offset.
const AMBIGUOUS_ZONES: &[&str] = &[
    "IST", "CST", "CDT", "AST", "ADT", "BST", "SST", "GST", "ECT",
];

/// True for an abbreviation that names more than one UTC offset.
pub fn is_ambiguous_zone(token: &str) -> bool {
    AMBIGUOUS_ZONES.contains(&token)
}

/// Resolve a zone token ("PDT", "+0100", "+05", "UTC-03:30") to a fixed
/// offset. Ambiguous abbreviations resolve to `None`.
pub fn zone_offset(token: &str) -> Option<FixedOffset> {
    if let Some((_, minutes)) = ZONE_TABLE.iter().find(|(name, _)| *name == token) {
        return FixedOffset::east_opt(minutes * 60);
    }

    let caps = NUMERIC_OFFSET.captures(token)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let secs = (hours * 60 + minutes) * 60;
    if &caps[1] == "-" {
        FixedOffset::west_opt(secs)
    } else {
        FixedOffset::east_opt(secs)
    }
}

/// Split "1:12 AM PDT" / "04:03:00 PDT" into the clock time and zone token.
pub fn parse_clock(text: &str) -> Option<(NaiveTime, &str)> {
    let text = text.trim();
    let (clock, zone) = text.rsplit_once(char::is_whitespace)?;
    let clock = clock.trim();
    let time = CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(clock, fmt).ok())?;
    Some((time, zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_hour_clock() {
        let (t, z) = parse_clock("1:12 PM PDT").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(13, 12, 0).unwrap());
        assert_eq!(z, "PDT");
    }

    #[test]
    fn twenty_four_hour_clock_with_seconds() {
        let (t, z) = parse_clock("04:03:00 PDT").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(4, 3, 0).unwrap());
        assert_eq!(z, "PDT");
    }

    #[test]
    fn clock_without_zone_is_rejected() {
        assert!(parse_clock("04:03").is_none());
        assert!(parse_clock("noon PDT").is_none());
    }

    #[test]
    fn zone_abbreviations_and_offsets() {
        assert_eq!(zone_offset("PDT"), FixedOffset::west_opt(7 * 3600));
        assert_eq!(zone_offset("+0100"), FixedOffset::east_opt(3600));
        assert_eq!(zone_offset("UTC-03:30"), FixedOffset::west_opt(3 * 3600 + 1800));
        assert_eq!(zone_offset("NZDT"), FixedOffset::east_opt(13 * 3600));
        assert!(zone_offset("XYZ").is_none());
        assert!(zone_offset("+2500").is_none());
    }

    #[test]
    fn tz_database_numeric_abbreviations() {
        assert_eq!(zone_offset("+05"), FixedOffset::east_opt(5 * 3600));
        assert_eq!(zone_offset("-03"), FixedOffset::west_opt(3 * 3600));
        assert_eq!(zone_offset("+0530"), FixedOffset::east_opt(5 * 3600 + 1800));
    }

    #[test]
    fn southern_hemisphere_and_asian_zones() {
        assert_eq!(zone_offset("SAST"), FixedOffset::east_opt(2 * 3600));
        assert_eq!(zone_offset("WIB"), FixedOffset::east_opt(7 * 3600));
        assert_eq!(zone_offset("BRT"), FixedOffset::west_opt(3 * 3600));
        assert_eq!(zone_offset("NPT"), FixedOffset::east_opt(5 * 3600 + 45 * 60));
    }

    #[test]
    fn ambiguous_abbreviations_have_no_offset() {
        for zone in ["IST", "CST", "CDT", "AST", "BST", "SST"] {
            assert!(is_ambiguous_zone(zone), "{zone}");
            assert!(zone_offset(zone).is_none(), "{zone}");
        }
        assert!(!is_ambiguous_zone("PDT"));
    }
}

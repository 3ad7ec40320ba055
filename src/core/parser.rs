//! Turn the text printed by `tide` into [`TideEvent`]s.
//!
//! Two line shapes are recognised:
//!
//! * XTide CSV (`-f c`):
//!   `Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,1:12 AM PDT,8.50 ft,High Tide`
//!   (commas inside the station name are printed as `|`).
//! * Verbose: `2024-07-11 04:03:00 PDT, High Tide, 6.34 feet`.
//!
//! Anything else is skipped and counted. A single bad line never fails the
//! batch; the caller decides what an all-skipped batch means.

use crate::errors::{AppError, AppResult};
use crate::models::event::TideEvent;
use crate::models::event_kind::EventKind;
use crate::utils::time::{is_ambiguous_zone, parse_clock, zone_offset};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(.+)$").expect("valid date prefix regex")
});

static LEVEL_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d").expect("valid level regex"));

/// Why a line produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSkip {
    Unrecognised,
    /// The zone abbreviation names several UTC offsets.
    AmbiguousZone(String),
}

/// Result of parsing one program run.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub events: Vec<TideEvent>,
    /// Non-blank lines that could not be turned into an event.
    pub skipped: usize,
    /// Non-blank lines seen.
    pub total: usize,
    /// Ambiguous zone abbreviations met on skipped lines, first seen first.
    pub ambiguous_zones: Vec<String>,
}

impl ParseReport {
    /// Non-empty output that produced nothing usable: the program's format
    /// has most likely changed.
    pub fn is_format_mismatch(&self) -> bool {
        self.total > 0 && self.events.is_empty()
    }

    pub fn into_events(self) -> AppResult<Vec<TideEvent>> {
        if self.is_format_mismatch() {
            if !self.ambiguous_zones.is_empty() {
                return Err(AppError::AmbiguousZone {
                    zones: self.ambiguous_zones.join(", "),
                });
            }
            return Err(AppError::FormatMismatch { lines: self.total });
        }
        Ok(self.events)
    }
}

/// Parse raw program output. `location` is used for lines that do not name
/// their station.
pub fn parse(raw: &str, location: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        report.total += 1;

        match classify_line(line, location) {
            Ok(ev) => report.events.push(ev),
            Err(LineSkip::AmbiguousZone(zone)) => {
                if !report.ambiguous_zones.contains(&zone) {
                    log::warn!("zone '{zone}' names several UTC offsets; skipping its lines");
                    report.ambiguous_zones.push(zone);
                }
                report.skipped += 1;
            }
            Err(LineSkip::Unrecognised) => {
                log::debug!("skipping unrecognised tide line: {line}");
                report.skipped += 1;
            }
        }
    }

    if report.skipped > 0 {
        log::info!(
            "parsed {} tide event(s), skipped {} of {} line(s)",
            report.events.len(),
            report.skipped,
            report.total
        );
    }
    report
}

/// Parse a single line in either recognised shape.
pub fn parse_line(line: &str, location: &str) -> Option<TideEvent> {
    classify_line(line, location).ok()
}

/// Same as [`parse_line`], saying why a line was rejected.
pub fn classify_line(line: &str, location: &str) -> Result<TideEvent, LineSkip> {
    let fields = split_fields(line).ok_or(LineSkip::Unrecognised)?;

    if fields.len() >= 5 && NaiveDate::parse_from_str(&fields[1], "%Y-%m-%d").is_ok() {
        return parse_csv_fields(line, &fields, location);
    }
    if fields.len() >= 2 {
        return parse_verbose_fields(line, &fields, location);
    }
    Err(LineSkip::Unrecognised)
}

fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let record = rdr.records().next()?.ok()?;
    Some(record.iter().map(str::to_string).collect())
}

// location,date,time zone,level,label[,label continued]
fn parse_csv_fields(line: &str, fields: &[String], location: &str) -> Result<TideEvent, LineSkip> {
    let station = if fields[0].is_empty() {
        location.to_string()
    } else {
        fields[0].replace('|', ",")
    };
    let (timestamp, zone) = zoned_timestamp(&fields[1], &fields[2])?;
    let label = fields[4..].join(", ");
    if label.is_empty() {
        return Err(LineSkip::Unrecognised);
    }

    Ok(TideEvent::new(
        station,
        timestamp,
        zone,
        EventKind::from_label(&label),
        fields[3].clone(),
        line,
    ))
}

// date time zone, label[, label continued][, level]
fn parse_verbose_fields(
    line: &str,
    fields: &[String],
    location: &str,
) -> Result<TideEvent, LineSkip> {
    let caps = DATE_PREFIX
        .captures(&fields[0])
        .ok_or(LineSkip::Unrecognised)?;
    let (timestamp, zone) = zoned_timestamp(&caps[1], &caps[2])?;

    let rest = &fields[1..];
    let (label_fields, level) = match rest.split_last() {
        Some((last, head)) if !head.is_empty() && LEVEL_LIKE.is_match(last) => {
            (head, last.clone())
        }
        _ => (rest, String::new()),
    };
    let label = label_fields.join(", ");
    if label.is_empty() {
        return Err(LineSkip::Unrecognised);
    }

    Ok(TideEvent::new(
        location,
        timestamp,
        zone,
        EventKind::from_label(&label),
        level,
        line,
    ))
}

fn zoned_timestamp(date: &str, clock: &str) -> Result<(DateTime<FixedOffset>, String), LineSkip> {
    let date =
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| LineSkip::Unrecognised)?;
    let (time, zone) = parse_clock(clock).ok_or(LineSkip::Unrecognised)?;
    if is_ambiguous_zone(zone) {
        return Err(LineSkip::AmbiguousZone(zone.to_string()));
    }
    let offset = zone_offset(zone).ok_or(LineSkip::Unrecognised)?;
    let ts = offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(LineSkip::Unrecognised)?;
    Ok((ts, zone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOC: &str = "Palo Alto Yacht Harbor, San Francisco Bay, California";

    const CSV_SAMPLE: &str = "\
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,1:12 AM PDT,8.50 ft,High Tide
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,5:54 AM PDT,,Sunrise
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,7:24 AM PDT,,Moonrise
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,9:31 AM PDT,-0.64 ft,Low Tide
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,4:02 PM PDT,7.12 ft,High Tide
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,8:35 PM PDT,,Sunset
Palo Alto Yacht Harbor| San Francisco Bay| California,2024-07-07,9:48 PM PDT,3.90 ft,Low Tide
";

    #[test]
    fn seven_line_csv_sample() {
        let report = parse(CSV_SAMPLE, "ignored");
        assert_eq!(report.total, 7);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.events.len(), 7);

        let first = &report.events[0];
        assert_eq!(first.kind, EventKind::HighTide);
        assert_eq!(first.location, LOC);
        assert_eq!(first.level_text, "8.50 ft");
        assert_eq!(first.zone, "PDT");
        assert_eq!(
            first.timestamp,
            DateTime::parse_from_rfc3339("2024-07-07T01:12:00-07:00").unwrap()
        );

        assert_eq!(report.events[1].kind, EventKind::Sunrise);
        assert_eq!(report.events[1].level_text, "");
        assert_eq!(report.events[3].kind, EventKind::LowTide);
        assert_eq!(report.events[3].level_text, "-0.64 ft");
        assert_eq!(report.events[4].timestamp.format("%H:%M").to_string(), "16:02");
    }

    #[test]
    fn verbose_line() {
        let ev = parse_line("2024-07-11 04:03:00 PDT, High Tide, 6.34 feet", LOC).unwrap();
        assert_eq!(ev.kind, EventKind::HighTide);
        assert_eq!(ev.level_text, "6.34 feet");
        assert_eq!(ev.location, LOC);
        assert_eq!(
            ev.timestamp,
            DateTime::parse_from_rfc3339("2024-07-11T04:03:00-07:00").unwrap()
        );
    }

    #[test]
    fn labels_with_commas_are_rejoined() {
        let ev = parse_line(
            "Redwood Creek,2024-07-07,2:10 PM PDT,0.00 knots,Slack, Flood Begins",
            LOC,
        )
        .unwrap();
        assert_eq!(ev.kind, EventKind::SlackTide);
        assert_eq!(ev.level_text, "0.00 knots");

        let ev = parse_line("2024-07-07 14:10 PDT, Slack, Ebb Begins", LOC).unwrap();
        assert_eq!(ev.kind, EventKind::SlackTide);
        assert_eq!(ev.level_text, "");
    }

    #[test]
    fn unknown_label_is_preserved() {
        let ev = parse_line("2024-07-07 14:10 PDT, Mars Transit", LOC).unwrap();
        assert_eq!(ev.kind, EventKind::Unknown("Mars Transit".into()));
    }

    #[test]
    fn empty_input_is_not_a_mismatch() {
        let report = parse("", LOC);
        assert_eq!(report.total, 0);
        assert!(!report.is_format_mismatch());
        assert!(report.into_events().unwrap().is_empty());

        assert_eq!(parse("\n  \n\r\n", LOC).total, 0);
    }

    #[test]
    fn garbage_is_a_format_mismatch() {
        let report = parse("XTide 2.15\nno tides here\n<html>\n", LOC);
        assert_eq!(report.total, 3);
        assert_eq!(report.skipped, 3);
        match report.into_events() {
            Err(AppError::FormatMismatch { lines }) => assert_eq!(lines, 3),
            other => panic!("expected FormatMismatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_lines_do_not_fail_the_batch() {
        let raw = format!("header line\n{}garbled,2024-13-40,xx,yy,zz\n", CSV_SAMPLE);
        let report = parse(&raw, LOC);
        assert_eq!(report.events.len(), 7);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn unknown_zone_skips_line() {
        assert!(parse_line("2024-07-11 04:03 QQT, High Tide, 6.34 feet", LOC).is_none());
    }

    #[test]
    fn ambiguous_zone_is_skipped_not_guessed() {
        for zone in ["IST", "CST"] {
            let line = format!("2024-07-11 04:03 {zone}, High Tide, 1.20 m");
            assert!(parse_line(&line, LOC).is_none());
            assert_eq!(
                classify_line(&line, LOC),
                Err(LineSkip::AmbiguousZone(zone.to_string()))
            );
        }

        let raw = "Chennai| India,2024-07-11,4:03 AM IST,1.20 m,High Tide\n\
                   Chennai| India,2024-07-11,10:40 AM IST,0.30 m,Low Tide\n";
        let report = parse(raw, LOC);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.ambiguous_zones, vec!["IST"]);
        match report.into_events() {
            Err(AppError::AmbiguousZone { zones }) => assert_eq!(zones, "IST"),
            other => panic!("expected AmbiguousZone, got {other:?}"),
        }
    }

    #[test]
    fn cape_town_station() {
        let raw = "Cape Town| South Africa,2024-07-11,5:21 AM SAST,1.71 m,High Tide\n\
                   Cape Town| South Africa,2024-07-11,11:38 AM SAST,0.32 m,Low Tide\n";
        let events = parse(raw, LOC).into_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].location, "Cape Town, South Africa");
        assert_eq!(
            events[0].timestamp,
            DateTime::parse_from_rfc3339("2024-07-11T05:21:00+02:00").unwrap()
        );
        assert_eq!(events[1].kind, EventKind::LowTide);
    }

    #[test]
    fn bare_numeric_zone() {
        let ev = parse_line("2024-07-11 04:03 -03, High Tide, 1.10 m", LOC).unwrap();
        assert_eq!(ev.zone, "-03");
        assert_eq!(ev.timestamp.offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn dst_boundary_keeps_reported_offset() {
        // 01:30 occurs twice on 2024-11-03 in California; the zone token decides.
        let pdt = parse_line("2024-11-03 01:30 PDT, Low Tide, 1.00 ft", LOC).unwrap();
        let pst = parse_line("2024-11-03 01:30 PST, Low Tide, 1.00 ft", LOC).unwrap();
        assert_eq!(pst.epoch() - pdt.epoch(), 3600);
        assert_eq!(pdt.timestamp.offset().local_minus_utc(), -7 * 3600);
    }
}

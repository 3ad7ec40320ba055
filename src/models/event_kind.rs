use serde::{Serialize, Serializer};

/// Kind of a predicted event, derived from the label printed by XTide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    HighTide,
    LowTide,
    SlackTide,
    MaxFloodCurrent,
    MaxEbbCurrent,
    Sunrise,
    Sunset,
    Moonrise,
    Moonset,
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
    /// Label outside the known vocabulary, kept verbatim.
    Unknown(String),
}

impl EventKind {
    /// Map a program label (case-sensitive) to a kind.
    pub fn from_label(label: &str) -> Self {
        match label {
            "High Tide" => EventKind::HighTide,
            "Low Tide" => EventKind::LowTide,
            "Slack" | "Slack, Flood Begins" | "Slack, Ebb Begins" => EventKind::SlackTide,
            "Max Flood" => EventKind::MaxFloodCurrent,
            "Max Ebb" => EventKind::MaxEbbCurrent,
            "Sunrise" => EventKind::Sunrise,
            "Sunset" => EventKind::Sunset,
            "Moonrise" => EventKind::Moonrise,
            "Moonset" => EventKind::Moonset,
            "New Moon" => EventKind::NewMoon,
            "First Quarter" => EventKind::FirstQuarter,
            "Full Moon" => EventKind::FullMoon,
            "Last Quarter" => EventKind::LastQuarter,
            other => EventKind::Unknown(other.to_string()),
        }
    }

    /// Human label, as a template would print it.
    pub fn label(&self) -> &str {
        match self {
            EventKind::HighTide => "High Tide",
            EventKind::LowTide => "Low Tide",
            EventKind::SlackTide => "Slack",
            EventKind::MaxFloodCurrent => "Max Flood",
            EventKind::MaxEbbCurrent => "Max Ebb",
            EventKind::Sunrise => "Sunrise",
            EventKind::Sunset => "Sunset",
            EventKind::Moonrise => "Moonrise",
            EventKind::Moonset => "Moonset",
            EventKind::NewMoon => "New Moon",
            EventKind::FirstQuarter => "First Quarter",
            EventKind::FullMoon => "Full Moon",
            EventKind::LastQuarter => "Last Quarter",
            EventKind::Unknown(raw) => raw,
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventKind::HighTide => "high_tide",
            EventKind::LowTide => "low_tide",
            EventKind::SlackTide => "slack",
            EventKind::MaxFloodCurrent => "max_flood",
            EventKind::MaxEbbCurrent => "max_ebb",
            EventKind::Sunrise => "sunrise",
            EventKind::Sunset => "sunset",
            EventKind::Moonrise => "moonrise",
            EventKind::Moonset => "moonset",
            EventKind::NewMoon => "new_moon",
            EventKind::FirstQuarter => "first_quarter",
            EventKind::FullMoon => "full_moon",
            EventKind::LastQuarter => "last_quarter",
            EventKind::Unknown(_) => "unknown",
        }
    }

    /// Convert DB string → enum. `label` is the verbatim label column,
    /// needed to rebuild `Unknown`.
    pub fn from_db_str(s: &str, label: &str) -> Option<Self> {
        let kind = match s {
            "high_tide" => EventKind::HighTide,
            "low_tide" => EventKind::LowTide,
            "slack" => EventKind::SlackTide,
            "max_flood" => EventKind::MaxFloodCurrent,
            "max_ebb" => EventKind::MaxEbbCurrent,
            "sunrise" => EventKind::Sunrise,
            "sunset" => EventKind::Sunset,
            "moonrise" => EventKind::Moonrise,
            "moonset" => EventKind::Moonset,
            "new_moon" => EventKind::NewMoon,
            "first_quarter" => EventKind::FirstQuarter,
            "full_moon" => EventKind::FullMoon,
            "last_quarter" => EventKind::LastQuarter,
            "unknown" => EventKind::Unknown(label.to_string()),
            _ => return None,
        };
        Some(kind)
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_are_case_sensitive() {
        assert_eq!(EventKind::from_label("High Tide"), EventKind::HighTide);
        assert_eq!(
            EventKind::from_label("high tide"),
            EventKind::Unknown("high tide".into())
        );
    }

    #[test]
    fn slack_variants_collapse() {
        assert_eq!(
            EventKind::from_label("Slack, Flood Begins"),
            EventKind::SlackTide
        );
        assert_eq!(EventKind::from_label("Slack, Ebb Begins"), EventKind::SlackTide);
    }

    #[test]
    fn db_str_rebuilds_unknown_from_label() {
        let k = EventKind::from_label("Mars Rise");
        let back = EventKind::from_db_str(k.to_db_str(), "Mars Rise").unwrap();
        assert_eq!(back, k);
        assert!(EventKind::from_db_str("bogus", "").is_none());
    }
}

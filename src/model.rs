use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Continent {
    Africa,
    Antarctica,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    pub const ALL: [Continent; 7] = [
        Continent::Africa,
        Continent::Antarctica,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Continent::Africa => "AF",
            Continent::Antarctica => "AN",
            Continent::Asia => "AS",
            Continent::Europe => "EU",
            Continent::NorthAmerica => "NA",
            Continent::Oceania => "OC",
            Continent::SouthAmerica => "SA",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|continent| continent.as_str() == code)
    }
}

/// One or more continent codes, rendered comma-joined (`"EU,AS"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinentSet(Vec<Continent>);

impl ContinentSet {
    pub fn parse(token: &str) -> Option<Self> {
        let mut codes = Vec::new();
        for part in token.split(',') {
            let continent = Continent::from_code(part.trim())?;
            if !codes.contains(&continent) {
                codes.push(continent);
            }
        }

        if codes.is_empty() {
            return None;
        }
        Some(Self(codes))
    }

    pub fn iter(&self) -> impl Iterator<Item = Continent> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ContinentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|continent| continent.as_str())
            .collect::<Vec<&str>>()
            .join(",");
        f.write_str(&joined)
    }
}

impl Serialize for ContinentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// ITU or CQ zone as printed: a number, or a letter pointing into the zone legend.
///
/// Letters stay unresolved in the parsed record; [`ZoneLegend::resolve`] expands
/// them when a consumer needs the numeric ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneRef {
    Number(u32),
    Letter(char),
}

impl ZoneRef {
    pub fn parse(token: &str) -> Option<Self> {
        if !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit()) {
            let number = token.parse::<u32>().ok()?;
            return (number > 0).then_some(ZoneRef::Number(number));
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_uppercase() => Some(ZoneRef::Letter(letter)),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Number(number) => write!(f, "{number}"),
            ZoneRef::Letter(letter) => write!(f, "{letter}"),
        }
    }
}

/// Which table an entity or footnote belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    Current,
    Deleted,
}

impl NoteScope {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteScope::Current => "current",
            NoteScope::Deleted => "deleted",
        }
    }

    pub fn note_key(self, number: u32) -> String {
        format!("{}_note_{}", self.as_str(), number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolNote {
    QslService,
    ThirdPartyTraffic,
    AntarcticaSpecial,
}

impl SymbolNote {
    pub fn key(self) -> &'static str {
        match self {
            SymbolNote::QslService => "qsl_service",
            SymbolNote::ThirdPartyTraffic => "third_party_traffic",
            SymbolNote::AntarcticaSpecial => "antarctica_special",
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '*' => Some(SymbolNote::QslService),
            '#' => Some(SymbolNote::ThirdPartyTraffic),
            '^' => Some(SymbolNote::AntarcticaSpecial),
            _ => None,
        }
    }
}

/// Zone letter to numeric range lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneLegend(BTreeMap<String, String>);

impl ZoneLegend {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn resolve(&self, zone: &ZoneRef) -> Option<String> {
        match zone {
            ZoneRef::Number(number) => Some(number.to_string()),
            ZoneRef::Letter(letter) => self.0.get(&letter.to_string()).cloned(),
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl Default for ZoneLegend {
    fn default() -> Self {
        let entries = [
            ("A", "2, 3, 4, 9, 75"),
            ("B", "12, 13, 15"),
            ("C", "14, 16"),
            ("D", "20-26, 30-35, 75"),
            ("E", "33, 42, 43, 44"),
            ("F", "51, 54"),
            ("G", "55, 58, 59"),
            ("H", "6, 7, 8"),
            ("I", "67, 69-74"),
        ];

        Self(
            entries
                .into_iter()
                .map(|(letter, range)| (letter.to_string(), range.to_string()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub prefix: String,
    #[serde(rename = "entityName")]
    pub entity_name: String,
    pub continent: ContinentSet,
    #[serde(rename = "zoneITU")]
    pub zone_itu: ZoneRef,
    #[serde(rename = "zoneCQ")]
    pub zone_cq: ZoneRef,
    #[serde(rename = "entityCode")]
    pub entity_code: u32,
    pub notes: Vec<String>,
    #[serde(rename = "isCurrent")]
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub current_entities: usize,
    pub deleted_entities: usize,
    pub continents: BTreeMap<String, usize>,
    pub current_footnotes: usize,
    pub deleted_footnotes: usize,
    pub symbol_notes: usize,
    pub unmatched_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub edition: String,
    pub total_entities: usize,
    pub generated_at: String,
    pub filter: String,
    pub source_file: Option<String>,
    pub source_sha256: Option<String>,
    pub statistics: Statistics,
    pub notes: BTreeMap<String, String>,
    pub zone_legend: ZoneLegend,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub metadata: Metadata,
    pub entities: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continent_set_rejects_unknown_codes() {
        assert!(ContinentSet::parse("EU").is_some());
        assert_eq!(ContinentSet::parse("EU,AS").map(|set| set.to_string()), Some("EU,AS".to_string()));
        assert!(ContinentSet::parse("EU,XX").is_none());
        assert!(ContinentSet::parse("Europe").is_none());
        assert!(ContinentSet::parse("").is_none());
    }

    #[test]
    fn zone_ref_accepts_numbers_and_single_letters() {
        assert_eq!(ZoneRef::parse("27"), Some(ZoneRef::Number(27)));
        assert_eq!(ZoneRef::parse("A"), Some(ZoneRef::Letter('A')));
        assert_eq!(ZoneRef::parse("0"), None);
        assert_eq!(ZoneRef::parse("AB"), None);
        assert_eq!(ZoneRef::parse("a"), None);
    }

    #[test]
    fn zone_legend_resolves_letters_lazily() {
        let legend = ZoneLegend::default();
        assert_eq!(
            legend.resolve(&ZoneRef::Letter('E')),
            Some("33, 42, 43, 44".to_string())
        );
        assert_eq!(legend.resolve(&ZoneRef::Number(14)), Some("14".to_string()));
        assert_eq!(legend.resolve(&ZoneRef::Letter('Z')), None);
    }

    #[test]
    fn zone_ref_serializes_as_number_or_letter() {
        assert_eq!(serde_json::to_string(&ZoneRef::Number(27)).unwrap(), "27");
        assert_eq!(serde_json::to_string(&ZoneRef::Letter('B')).unwrap(), "\"B\"");
    }

    #[test]
    fn note_keys_are_scope_qualified() {
        assert_eq!(NoteScope::Current.note_key(5), "current_note_5");
        assert_eq!(NoteScope::Deleted.note_key(5), "deleted_note_5");
    }
}

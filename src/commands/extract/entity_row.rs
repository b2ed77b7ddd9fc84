use super::*;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct RowFields {
    pub(super) raw_prefix: String,
    pub(super) entity_name: String,
    pub(super) continent: ContinentSet,
    pub(super) zone_itu: ZoneRef,
    pub(super) zone_cq: ZoneRef,
    pub(super) entity_code: u32,
}

pub(super) type RowStrategy = fn(&EntityRowParser, &str) -> Option<RowFields>;

pub(super) const ROW_STRATEGIES: [(&str, RowStrategy); 3] = [
    ("strict", EntityRowParser::strict_columns),
    ("relaxed", EntityRowParser::relaxed_columns),
    ("tokens", EntityRowParser::token_columns),
];

#[derive(Debug)]
pub(super) struct EntityRowParser {
    strict: Regex,
    relaxed: Regex,
    note_group: Regex,
    prefix_reference: Regex,
}

impl EntityRowParser {
    pub(super) fn new() -> Result<Self> {
        let continents = format!("{CONTINENT_PATTERN}(?:,{CONTINENT_PATTERN})*");
        let spaced_continents = format!("{CONTINENT_PATTERN}(?:\\s*,\\s*{CONTINENT_PATTERN})*");

        Ok(Self {
            strict: Regex::new(&format!(
                r"^(?P<prefix>[A-Z0-9/,\-*^_#()]+)\s+(?P<name>[A-Za-z].*?)\s+(?P<continent>{continents})\s+(?P<itu>\d+)\s+(?P<cq>\d+)\s+(?P<code>\d+)$"
            ))
            .context("failed to compile strict entity row regex")?,
            relaxed: Regex::new(&format!(
                r"^(?P<prefix>[A-Za-z0-9/,\-_]+(?:\s*(?:[*#^]+|\(\s*\d+(?:\s*,\s*\d+)*\s*\)))*)\s+(?P<name>\S.*?)\s+(?P<continent>{spaced_continents})\s+(?P<itu>\d+|[A-Z])\s+(?P<cq>\d+|[A-Z])\s+(?P<code>\d+)\s*$"
            ))
            .context("failed to compile relaxed entity row regex")?,
            note_group: Regex::new(r"\(\s*\d+(?:\s*,\s*\d+)*\s*\)")
                .context("failed to compile footnote group regex")?,
            prefix_reference: Regex::new(r"\((?P<numbers>\s*\d+(?:\s*,\s*\d+)*\s*)\)|(?P<marker>[*#^])")
                .context("failed to compile prefix reference regex")?,
        })
    }

    pub(super) fn parse_entity_line(&self, line: &str, scope: NoteScope) -> Option<Entity> {
        let line = line.trim();
        let (strategy, fields) = ROW_STRATEGIES
            .iter()
            .find_map(|(name, strategy)| strategy(self, line).map(|fields| (*name, fields)))?;
        trace!(strategy, line, "entity row matched");

        let prefix = self.canonical_prefix(&fields.raw_prefix);
        if prefix.is_empty() {
            return None;
        }

        Some(Entity {
            prefix,
            notes: self.prefix_notes(&fields.raw_prefix, scope),
            entity_name: fields.entity_name,
            continent: fields.continent,
            zone_itu: fields.zone_itu,
            zone_cq: fields.zone_cq,
            entity_code: fields.entity_code,
            is_current: scope == NoteScope::Current,
        })
    }

    pub(super) fn strict_columns(&self, line: &str) -> Option<RowFields> {
        fields_from_captures(&self.strict.captures(line)?)
    }

    pub(super) fn relaxed_columns(&self, line: &str) -> Option<RowFields> {
        fields_from_captures(&self.relaxed.captures(line)?)
    }

    // Names ending in a continent-like or zone-like word are misread here.
    pub(super) fn token_columns(&self, line: &str) -> Option<RowFields> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();
        let count = tokens.len();
        if count < 6 {
            return None;
        }

        Some(RowFields {
            raw_prefix: tokens[0].to_string(),
            entity_name: tokens[1..count - 4].join(" "),
            continent: ContinentSet::parse(tokens[count - 4])?,
            zone_itu: ZoneRef::parse(tokens[count - 3])?,
            zone_cq: ZoneRef::parse(tokens[count - 2])?,
            entity_code: parse_entity_code(tokens[count - 1])?,
        })
    }

    fn canonical_prefix(&self, raw_prefix: &str) -> String {
        let without_groups = self.note_group.replace_all(raw_prefix, " ");
        let without_markers = without_groups.replace(['*', '#', '^'], " ");
        collapse_whitespace(&without_markers)
    }

    fn prefix_notes(&self, raw_prefix: &str, scope: NoteScope) -> Vec<String> {
        let mut notes = Vec::<String>::new();
        let mut push_unique = |key: String| {
            if !notes.contains(&key) {
                notes.push(key);
            }
        };

        for captures in self.prefix_reference.captures_iter(raw_prefix) {
            if let Some(numbers) = captures.name("numbers") {
                for number in numbers.as_str().split(',') {
                    if let Ok(number) = number.trim().parse::<u32>() {
                        push_unique(scope.note_key(number));
                    }
                }
                continue;
            }

            let symbol = captures
                .name("marker")
                .and_then(|marker| marker.as_str().chars().next())
                .and_then(SymbolNote::from_marker);
            if let Some(symbol) = symbol {
                push_unique(symbol.key().to_string());
            }
        }

        notes
    }

    pub(super) fn looks_like_row(&self, line: &str) -> bool {
        let length = line.chars().count();
        (8..=120).contains(&length)
            && line.chars().any(|ch| ch.is_ascii_digit())
            && line
                .split_whitespace()
                .any(|token| ContinentSet::parse(token).is_some())
    }
}

fn fields_from_captures(captures: &regex::Captures<'_>) -> Option<RowFields> {
    Some(RowFields {
        raw_prefix: captures.name("prefix")?.as_str().trim().to_string(),
        entity_name: collapse_whitespace(captures.name("name")?.as_str()),
        continent: ContinentSet::parse(captures.name("continent")?.as_str())?,
        zone_itu: ZoneRef::parse(captures.name("itu")?.as_str())?,
        zone_cq: ZoneRef::parse(captures.name("cq")?.as_str())?,
        entity_code: parse_entity_code(captures.name("code")?.as_str())?,
    })
}

fn parse_entity_code(token: &str) -> Option<u32> {
    if !token.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok().filter(|code| *code > 0)
}

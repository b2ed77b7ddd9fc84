use super::*;

#[derive(Debug, Default)]
pub(super) struct FootnoteScan {
    pub(super) notes: BTreeMap<String, String>,
    pub(super) duplicates: Vec<String>,
}

// A blank line ends the block only once a definition has been read.
pub(super) fn extract_footnotes(
    lines: &[&str],
    start: usize,
    scope: NoteScope,
    patterns: &LinePatterns,
) -> FootnoteScan {
    let mut scan = FootnoteScan::default();
    let mut index = start;
    let mut seen_definition = false;

    while index < lines.len() {
        let line = lines[index].trim();
        if crosses_boundary(line, scope) {
            break;
        }

        if line.is_empty() {
            if seen_definition {
                break;
            }
            index += 1;
            continue;
        }

        let Some((number, mut text)) = parse_definition(line, patterns) else {
            index += 1;
            continue;
        };
        index += 1;

        while index < lines.len() {
            let next = lines[index].trim();
            if next.is_empty()
                || patterns.footnote_definition.is_match(next)
                || crosses_boundary(next, scope)
            {
                break;
            }
            text.push(' ');
            text.push_str(next);
            index += 1;
        }

        let key = scope.note_key(number);
        if scan.notes.insert(key.clone(), text).is_some() {
            debug!(key = %key, "footnote number repeated; keeping last definition");
            scan.duplicates.push(key);
        }
        seen_definition = true;
    }

    scan
}

fn parse_definition(line: &str, patterns: &LinePatterns) -> Option<(u32, String)> {
    let captures = patterns.footnote_definition.captures(line)?;
    let number = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let text = captures.get(2)?.as_str().trim().to_string();
    Some((number, text))
}

fn crosses_boundary(line: &str, scope: NoteScope) -> bool {
    scope == NoteScope::Current && line.contains(DELETED_HEADER)
}

use crate::ini::document::{Comment, Document, Node, Property, Section};
use crate::ini::errors::IniError;

/// Parse INI text into a [`Document`].
///
/// Content ahead of the first header lands in an unnamed preamble section.
/// Blank lines are not kept as nodes; a preamble made only of blank lines
/// is kept as an empty section unless it is the whole document.
pub fn parse(content: &str) -> Result<Document, IniError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            if current.is_none() {
                current = Some(Section::preamble());
            }
            continue;
        }

        if trimmed.starts_with('[') {
            let name = parse_header(trimmed, line_no)?;
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section::new(name));
            continue;
        }

        let node = parse_node(line, line_no)?;
        current.get_or_insert_with(Section::preamble).nodes.push(node);
    }

    if let Some(section) = current {
        sections.push(section);
    }

    if matches!(sections.last(), Some(last) if last.is_preamble() && last.nodes.is_empty()) {
        sections.pop();
    }

    Ok(Document::from_sections(sections))
}

fn parse_node(line: &str, line_no: usize) -> Result<Node, IniError> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if let Some(text) = trimmed.strip_prefix('#') {
        return Ok(Comment::new(format!("{indent}#"), text.trim_end()).into());
    }

    parse_property(indent, trimmed)
        .map(Node::Property)
        .ok_or_else(|| IniError::InvalidLine {
            line: line_no,
            content: line.to_string(),
        })
}

fn parse_property(indent: &str, line: &str) -> Option<Property> {
    let mut escape = false;
    let mut eq_pos = None;

    for (idx, ch) in line.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '=' => {
                eq_pos = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let eq_idx = eq_pos?;
    let key_raw = &line[..eq_idx];
    let key_trimmed = key_raw.trim_end();
    if key_trimmed.is_empty() {
        return None;
    }

    let rest = &line[eq_idx + 1..];
    let value = rest.trim_start();
    let delimiter = format!(
        "{}={}",
        &key_raw[key_trimmed.len()..],
        &rest[..rest.len() - value.len()]
    );

    Some(Property {
        indent: indent.to_string(),
        key: unescape(key_trimmed, &['=', '\\']),
        value: value.trim_end().to_string(),
        delimiter,
    })
}

fn parse_header(line: &str, line_no: usize) -> Result<String, IniError> {
    let trimmed = line.trim();
    let mut name = String::new();
    let mut chars = trimmed.char_indices().skip(1);
    let mut close_pos = None;

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, next @ ('[' | ']' | '\\'))) => name.push(next),
                Some((_, next)) => {
                    name.push('\\');
                    name.push(next);
                }
                None => name.push('\\'),
            },
            ']' => {
                close_pos = Some(idx);
                break;
            }
            other => name.push(other),
        }
    }

    let close_pos = close_pos.ok_or_else(|| IniError::InvalidHeader {
        line: line_no,
        message: format!("unterminated section header: {trimmed}"),
    })?;

    let trailing = trimmed[close_pos + 1..].trim();
    if !trailing.is_empty() {
        return Err(IniError::InvalidHeader {
            line: line_no,
            message: format!("unexpected text after section header: {trailing}"),
        });
    }

    if name.is_empty() {
        return Err(IniError::InvalidHeader {
            line: line_no,
            message: "empty section name".to_string(),
        });
    }

    Ok(name)
}

/// Drop the backslash in front of any character listed in `escaped`.
fn unescape(input: &str, escaped: &[char]) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.peek().copied() {
                if escaped.contains(&next) {
                    output.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        output.push(ch);
    }

    output
}

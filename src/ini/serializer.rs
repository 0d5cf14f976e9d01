use crate::ini::document::{Document, Node};

/// Render `document` one line at a time. Lines are passed to `emit`
/// without their trailing newline.
pub fn serialize(document: &Document, mut emit: impl FnMut(&str)) {
    for section in document.sections() {
        if section.is_preamble() {
            if section.nodes.is_empty() {
                emit("");
            }
        } else {
            emit(&format!("[{}]", escape_section_name(&section.name)));
        }

        for node in &section.nodes {
            match node {
                Node::Property(property) => emit(&format!(
                    "{}{}{}{}",
                    property.indent,
                    escape_key(&property.key),
                    property.delimiter,
                    property.value
                )),
                Node::Comment(comment) => emit(&format!("{}{}", comment.prefix, comment.text)),
            }
        }
    }
}

pub fn escape_section_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn escape_key(key: &str) -> String {
    key.replace('\\', "\\\\").replace('=', "\\=")
}

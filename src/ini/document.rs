use std::fmt;

/// Delimiter used for properties created by an edit rather than parsed.
pub const DEFAULT_DELIMITER: &str = " = ";

/// A `key = value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Leading whitespace of the source line. Formatting only.
    pub indent: String,
    /// Unescaped key.
    pub key: String,
    pub value: String,
    /// Source text between key and value, `=` included. Formatting only.
    pub delimiter: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            indent: String::new(),
            key: key.into(),
            value: value.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// A comment line, kept as `<prefix><text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub prefix: String,
    pub text: String,
}

impl Comment {
    pub fn new(prefix: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            text: text.into(),
        }
    }

    /// Comment text with surrounding whitespace removed; this is what
    /// criteria and change sets compare against.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Property(Property),
    Comment(Comment),
}

impl Node {
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Node::Property(property) => Some(property),
            Node::Comment(_) => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Node::Comment(comment) => Some(comment),
            Node::Property(_) => None,
        }
    }
}

impl From<Property> for Node {
    fn from(property: Property) -> Self {
        Node::Property(property)
    }
}

impl From<Comment> for Node {
    fn from(comment: Comment) -> Self {
        Node::Comment(comment)
    }
}

/// A named block of nodes. The empty name marks the preamble: whatever
/// precedes the first `[header]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    pub name: String,
    pub nodes: Vec<Node>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub(crate) fn preamble() -> Self {
        Self::default()
    }

    pub fn is_preamble(&self) -> bool {
        self.name.is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.nodes.iter().filter_map(Node::as_property)
    }

    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.nodes.iter().filter_map(Node::as_comment)
    }

    /// Value of the first property named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties()
            .find(|property| property.key == key)
            .map(|property| property.value.as_str())
    }
}

/// An INI document: sections in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// First section with the given name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Names of all non-preamble sections, in order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|section| !section.is_preamble())
            .map(|section| section.name.as_str())
            .collect()
    }

    pub fn remove(&mut self, index: usize) -> Section {
        self.sections.remove(index)
    }

    pub fn insert(&mut self, index: usize, section: Section) {
        self.sections.insert(index, section);
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Index of the first section a prepended section may occupy: past the
    /// preamble, so the preamble stays ahead of every header.
    pub fn first_insert_index(&self) -> usize {
        match self.sections.first() {
            Some(section) if section.is_preamble() => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        crate::ini::serializer::serialize(self, |line| {
            if result.is_ok() {
                result = writeln!(f, "{line}");
            }
        });
        result
    }
}

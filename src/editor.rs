use crate::ini::document::{Comment, Document, Node, Property, Section};
use crate::ini::errors::IniError;
use crate::ini::parser::parse;
use crate::ini::serializer::serialize;
use crate::operations::{Change, ChangeSet, Positioning};
use crate::query::Query;
use crate::transform::{run, scan, Flow};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_COMMENT_PREFIX: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Prefix written in front of comments created by an edit. Parsed
    /// comments keep their own prefix.
    pub comment_prefix: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }
}

/// A parsed INI document together with the query-driven edit operations.
///
/// Every operation takes a [`Query`] selecting the sections it applies to
/// and returns how many sections matched.
#[derive(Debug, Clone)]
pub struct IniEditor {
    document: Document,
    options: EditorOptions,
}

impl IniEditor {
    pub fn parse(content: &str) -> Result<Self, IniError> {
        Self::with_options(content, EditorOptions::default())
    }

    pub fn with_options(content: &str, options: EditorOptions) -> Result<Self, IniError> {
        Ok(Self::from_document(parse(content)?, options))
    }

    pub fn from_document(document: Document, options: EditorOptions) -> Self {
        Self { document, options }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn set_comment_prefix(&mut self, prefix: impl Into<String>) {
        self.options.comment_prefix = prefix.into();
    }

    /// Call `f` on every section matching `query`; see [`crate::transform::run`].
    pub fn run<F>(&mut self, query: &Query, f: F) -> usize
    where
        F: FnMut(&mut Document, usize) -> Flow,
    {
        run(&mut self.document, query, f)
    }

    /// Number of sections matching `query`.
    pub fn count(&self, query: &Query) -> usize {
        scan(&self.document, query, |_, _| Flow::Continue)
    }

    /// Remove every section matching `query`.
    pub fn delete_section(&mut self, query: &Query) -> usize {
        self.run(query, |document, index| {
            document.remove(index);
            Flow::Continue
        })
    }

    /// Edit every section matching `query`.
    ///
    /// Properties whose key is `Set` in `properties` take the new value;
    /// `Delete` removes them. `Set` keys the section lacks are appended.
    /// Comments whose trimmed text is `Delete` in `comments` are removed and
    /// `Set` comment keys are prepended, in change-set order. `new_name`
    /// renames the section.
    ///
    /// Fails without touching the document when `new_name` is not a valid
    /// section name or a key, value or comment spans several lines.
    pub fn modify_section(
        &mut self,
        query: &Query,
        properties: &ChangeSet,
        comments: &ChangeSet,
        new_name: Option<&str>,
    ) -> Result<usize, IniError> {
        if let Some(name) = new_name {
            check_section_name(name)?;
        }
        check_changes(properties, comments)?;

        let prefix = &self.options.comment_prefix;

        Ok(run(&mut self.document, query, |document, index| {
            let Some(section) = document.get_mut(index) else {
                return Flow::Continue;
            };

            if let Some(name) = new_name {
                section.name = name.to_string();
            }

            let mut visited = HashSet::new();
            section.nodes.retain_mut(|node| match node {
                Node::Property(property) => match properties.get(&property.key) {
                    Some(Change::Set(value)) => {
                        visited.insert(property.key.clone());
                        property.value = value.clone();
                        true
                    }
                    Some(Change::Delete) => false,
                    None => true,
                },
                Node::Comment(comment) => {
                    !matches!(comments.get(comment.trimmed()), Some(Change::Delete))
                }
            });

            for (key, value) in properties.sets() {
                if !visited.contains(key) {
                    section.nodes.push(Property::new(key, value).into());
                }
            }

            let new_comments: Vec<Node> = comments
                .sets()
                .map(|(text, _)| Comment::new(prefix.as_str(), text).into())
                .collect();
            section.nodes.splice(0..0, new_comments);

            Flow::Continue
        }))
    }

    /// Add a section named `name` holding `comments` then the `Set` entries
    /// of `properties`.
    ///
    /// With a non-empty `query`, the section is only added when at least one
    /// existing section matches. Returns 1 when added, 0 otherwise.
    pub fn add_section(
        &mut self,
        name: &str,
        properties: &ChangeSet,
        comments: &[&str],
        positioning: Positioning,
        query: Option<&Query>,
    ) -> Result<usize, IniError> {
        check_section_name(name)?;
        check_changes(properties, &ChangeSet::new())?;
        for text in comments {
            check_single_line("comment", text)?;
        }

        if let Some(query) = query {
            if !query.is_empty() && scan(&self.document, query, |_, _| Flow::Stop) == 0 {
                return Ok(0);
            }
        }

        let mut section = Section::new(name);
        for text in comments {
            section
                .nodes
                .push(Comment::new(self.options.comment_prefix.as_str(), *text).into());
        }
        for (key, value) in properties.sets() {
            section.nodes.push(Property::new(key, value).into());
        }

        match positioning {
            Positioning::AtBeginning => {
                let index = self.document.first_insert_index();
                self.document.insert(index, section);
            }
            Positioning::AtEnd => self.document.push(section),
        }

        Ok(1)
    }

    /// For every section matching `query`, emit the values of properties
    /// named in `names` and, with `include_comments`, the trimmed text of
    /// each comment, in document order.
    pub fn read_properties(
        &self,
        query: &Query,
        names: &[&str],
        include_comments: bool,
        mut emit: impl FnMut(&str),
    ) -> usize {
        scan(&self.document, query, |_, section| {
            for node in &section.nodes {
                match node {
                    Node::Property(property) if names.contains(&property.key.as_str()) => {
                        emit(&property.value);
                    }
                    Node::Comment(comment) if include_comments => emit(comment.trimmed()),
                    _ => {}
                }
            }
            Flow::Continue
        })
    }

    pub fn serialize(&self, emit: impl FnMut(&str)) {
        serialize(&self.document, emit);
    }
}

/// The empty name is reserved for the preamble, which has no header line.
fn check_section_name(name: &str) -> Result<(), IniError> {
    if name.is_empty() {
        return Err(IniError::InvalidSectionName {
            name: name.to_string(),
            message: "section name must not be empty".to_string(),
        });
    }
    check_single_line("section name", name)
}

fn check_changes(properties: &ChangeSet, comments: &ChangeSet) -> Result<(), IniError> {
    for (key, change) in properties.iter() {
        check_single_line("property key", key)?;
        if let Change::Set(value) = change {
            check_single_line("property value", value)?;
        }
    }
    for (text, _) in comments.iter() {
        check_single_line("comment", text)?;
    }
    Ok(())
}

fn check_single_line(field: &'static str, text: &str) -> Result<(), IniError> {
    if text.contains(['\n', '\r']) {
        return Err(IniError::LineBreak {
            field,
            text: text.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for IniEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.document, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Pattern;

    fn editor(content: &str) -> IniEditor {
        IniEditor::parse(content).unwrap()
    }

    #[test]
    fn delete_by_section_name() {
        let mut ini = editor("[A]\nX=1\n[B]\nX=2\n");
        assert_eq!(ini.delete_section(&Query::for_sections(["A"])), 1);
        assert_eq!(ini.to_string(), "[B]\nX=2\n");
    }

    #[test]
    fn delete_adjacent_matches() {
        let mut ini = editor("[A]\nX = 1\n[A]\nX = 2\n[B]\nX = 3\n");
        assert_eq!(ini.delete_section(&Query::for_sections(["A"])), 2);
        assert_eq!(ini.to_string(), "[B]\nX = 3\n");
    }

    #[test]
    fn delete_with_regex_criteria() {
        let mut ini = editor("[Z]\nA = str\n# CCC\n[ZZZ]\nA = sr\n# CC\n[Z]\nA = x\n");
        let query = Query::default()
            .with_section("Z")
            .with_section(Pattern::regex("ZZ+$").unwrap())
            .with_where(Some("A".into()), Some(Pattern::regex("st?r?").unwrap()))
            .with_comment(Pattern::regex("^C+.*C?$").unwrap());
        assert_eq!(ini.delete_section(&query), 2);
        assert_eq!(ini.to_string(), "[Z]\nA = x\n");
    }

    #[test]
    fn modify_replaces_deletes_and_appends() {
        let mut ini = editor("[A]\nX=1\n");
        let properties = ChangeSet::new().delete("X").set("Y", "2");
        let count =
            ini.modify_section(&Query::for_sections(["A"]), &properties, &ChangeSet::new(), None).unwrap();
        assert_eq!(count, 1);
        assert_eq!(ini.to_string(), "[A]\nY = 2\n");
    }

    #[test]
    fn modify_keeps_delimiter_of_replaced_value() {
        let mut ini = editor("[A]\nX=1\nZ = 3\n");
        let properties = ChangeSet::new().set("X", "9");
        ini.modify_section(&Query::default(), &properties, &ChangeSet::new(), None).unwrap();
        assert_eq!(ini.to_string(), "[A]\nX=9\nZ = 3\n");
    }

    #[test]
    fn modify_comments_and_rename() {
        let mut ini = editor("[B]\n# Comment\nA = 1\n# Other\n");
        let comments = ChangeSet::new().delete("Comment").add("First").add("Second");
        let count = ini.modify_section(
            &Query::for_sections(["B"]).with_comment("Comment"),
            &ChangeSet::new(),
            &comments,
            Some("Renamed"),
        ).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            ini.to_string(),
            "[Renamed]\n#First\n#Second\nA = 1\n# Other\n"
        );
    }

    #[test]
    fn modify_uses_configured_prefix() {
        let mut ini = editor("[A]\n");
        ini.set_comment_prefix("# ");
        ini.modify_section(
            &Query::default(),
            &ChangeSet::new(),
            &ChangeSet::new().add("note"),
            None,
        ).unwrap();
        assert_eq!(ini.to_string(), "[A]\n# note\n");
    }

    #[test]
    fn modify_without_match_changes_nothing() {
        let mut ini = editor("[A]\nX = 1\n");
        let count = ini.modify_section(
            &Query::default().with_where(Some("X".into()), Some("2".into())),
            &ChangeSet::new().set("X", "3"),
            &ChangeSet::new(),
            None,
        ).unwrap();
        assert_eq!(count, 0);
        assert_eq!(ini.to_string(), "[A]\nX = 1\n");
    }

    #[test]
    fn add_to_empty_document() {
        let mut ini = editor("");
        let count = ini.add_section(
            "New",
            &ChangeSet::new().set("K", "V"),
            &["hello"],
            Positioning::AtEnd,
            None,
        ).unwrap();
        assert_eq!(count, 1);
        assert_eq!(ini.to_string(), "[New]\n#hello\nK = V\n");
    }

    #[test]
    fn add_skips_deleted_properties() {
        let mut ini = editor("");
        ini.add_section(
            "Bottom",
            &ChangeSet::new().delete("A").set("B", "2"),
            &["#=comment#="],
            Positioning::AtEnd,
            None,
        ).unwrap();
        assert_eq!(ini.to_string(), "[Bottom]\n##=comment#=\nB = 2\n");
    }

    #[test]
    fn add_prepends_after_preamble() {
        let mut ini = editor("# header\n[A]\nX = 1\n");
        ini.add_section("Top", &ChangeSet::new(), &[], Positioning::AtBeginning, None).unwrap();
        assert_eq!(ini.to_string(), "# header\n[Top]\n[A]\nX = 1\n");
    }

    #[test]
    fn add_requires_a_match_when_query_given() {
        let mut ini = editor("[A]\nX = 1\n");
        let miss = Query::for_sections(["B"]);
        let hit = Query::default().with_where(Some("X".into()), None);

        assert_eq!(
            ini.add_section("N", &ChangeSet::new(), &[], Positioning::AtEnd, Some(&miss)).unwrap(),
            0
        );
        assert_eq!(
            ini.add_section("N", &ChangeSet::new(), &[], Positioning::AtEnd, Some(&hit)).unwrap(),
            1
        );
        assert_eq!(
            ini.add_section("M", &ChangeSet::new(), &[], Positioning::AtEnd, Some(&Query::default())).unwrap(),
            1
        );
        assert_eq!(ini.document().section_names(), vec!["A", "N", "M"]);
    }

    #[test]
    fn read_emits_values_and_comments_in_order() {
        let ini = editor("[A]\n# one\nX = 1\nY = 2\n#two \n[B]\nX = 3\n");
        let mut out = Vec::new();
        let count = ini.read_properties(&Query::default(), &["X"], true, |value| {
            out.push(value.to_string())
        });
        assert_eq!(count, 2);
        assert_eq!(out, vec!["one", "1", "two", "3"]);
    }

    #[test]
    fn read_without_comments() {
        let ini = editor("[A]\n# one\nX = 1\n");
        let mut out = Vec::new();
        ini.read_properties(&Query::for_sections(["A"]), &["X", "Y"], false, |value| {
            out.push(value.to_string())
        });
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn add_rejects_empty_section_name() {
        let mut ini = editor("[A]\nX = 1\n");
        let err = ini
            .add_section("", &ChangeSet::new().set("K", "V"), &[], Positioning::AtEnd, None)
            .unwrap_err();
        assert!(matches!(err, IniError::InvalidSectionName { .. }));
        assert_eq!(ini.to_string(), "[A]\nX = 1\n");
    }

    #[test]
    fn rename_to_empty_name_is_rejected() {
        let mut ini = editor("[A]\nX = 1\n[B]\nY = 2\n");
        let err = ini
            .modify_section(
                &Query::for_sections(["B"]),
                &ChangeSet::new().set("Z", "3"),
                &ChangeSet::new(),
                Some(""),
            )
            .unwrap_err();
        assert!(matches!(err, IniError::InvalidSectionName { .. }));
        assert_eq!(ini.to_string(), "[A]\nX = 1\n[B]\nY = 2\n");
    }

    #[test]
    fn line_breaks_are_rejected() {
        let mut ini = editor("[A]\nX = 1\n");

        let err = ini
            .modify_section(
                &Query::default(),
                &ChangeSet::new().set("X", "v\n[Evil]"),
                &ChangeSet::new(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, IniError::LineBreak { field: "property value", .. }));

        let err = ini
            .modify_section(
                &Query::default(),
                &ChangeSet::new(),
                &ChangeSet::new().add("a\r\nb"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, IniError::LineBreak { field: "comment", .. }));

        let err = ini
            .add_section("N\n", &ChangeSet::new(), &[], Positioning::AtEnd, None)
            .unwrap_err();
        assert!(matches!(err, IniError::LineBreak { field: "section name", .. }));

        let err = ini
            .add_section("N", &ChangeSet::new(), &["x\ny"], Positioning::AtEnd, None)
            .unwrap_err();
        assert!(matches!(err, IniError::LineBreak { field: "comment", .. }));

        assert_eq!(ini.to_string(), "[A]\nX = 1\n");
    }

    #[test]
    fn modify_keeps_indentation() {
        let mut ini = editor("[A]\n  X = 1\n");
        ini.modify_section(&Query::default(), &ChangeSet::new().set("X", "2"), &ChangeSet::new(), None)
            .unwrap();
        assert_eq!(ini.to_string(), "[A]\n  X = 2\n");
    }
}

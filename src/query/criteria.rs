use crate::query::pattern::Pattern;

/// One key/value criterion. `None` on either side matches anything.
pub type WherePair = (Option<Pattern>, Option<Pattern>);

/// Criteria selecting the sections an operation applies to.
///
/// - `sections`: section-name patterns, ORed; an empty list accepts every
///   section.
/// - `where`: key/value pairs, ANDed; every pair must be satisfied by some
///   property of the section.
/// - `comments`: comment-text patterns, ANDed; literal patterns are trimmed
///   on construction since comment text is trimmed before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    sections: Vec<Pattern>,
    r#where: Vec<WherePair>,
    comments: Vec<Pattern>,
}

impl Query {
    pub fn new(sections: Vec<Pattern>, r#where: Vec<WherePair>, comments: Vec<Pattern>) -> Self {
        Self {
            sections,
            r#where,
            comments: comments.into_iter().map(Pattern::trimmed).collect(),
        }
    }

    /// Shorthand for a query on literal section names only.
    pub fn for_sections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names.into_iter().map(|name| Pattern::Literal(name.into())).collect(),
            Vec::new(),
            Vec::new(),
        )
    }

    pub fn with_section(mut self, pattern: impl Into<Pattern>) -> Self {
        self.sections.push(pattern.into());
        self
    }

    pub fn with_where(mut self, key: Option<Pattern>, value: Option<Pattern>) -> Self {
        self.r#where.push((key, value));
        self
    }

    pub fn with_comment(mut self, pattern: impl Into<Pattern>) -> Self {
        self.comments.push(pattern.into().trimmed());
        self
    }

    pub fn section_patterns(&self) -> &[Pattern] {
        &self.sections
    }

    pub fn where_pairs(&self) -> &[WherePair] {
        &self.r#where
    }

    pub fn comment_patterns(&self) -> &[Pattern] {
        &self.comments
    }

    /// Number of satisfied clauses a section needs to match. Section-name
    /// patterns are a pre-filter and do not count.
    pub fn required(&self) -> usize {
        self.r#where.len() + self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.r#where.is_empty() && self.comments.is_empty()
    }
}

/// Edit to apply to a property or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Set a property to this value, or add a comment. Comment change sets
    /// ignore the value.
    Set(String),
    /// Remove the property or comment.
    Delete,
}

/// Insertion-ordered key to [`Change`] map.
///
/// Re-setting a key replaces its change but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<(String, Change)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, change: Change) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = change,
            None => self.entries.push((key, change)),
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Change::Set(value.into()));
        self
    }

    /// Comment change sets only care about the key.
    pub fn add(self, key: impl Into<String>) -> Self {
        self.set(key, String::new())
    }

    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.insert(key, Change::Delete);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Change> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, change)| change)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Change)> {
        self.entries
            .iter()
            .map(|(key, change)| (key.as_str(), change))
    }

    /// Keys with a [`Change::Set`], and their values, in order.
    pub fn sets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(key, change)| match change {
            Change::Set(value) => Some((key, value.as_str())),
            Change::Delete => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Change)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, Change)>>(iter: I) -> Self {
        let mut changes = ChangeSet::new();
        for (key, change) in iter {
            changes.insert(key, change);
        }
        changes
    }
}

/// Where `add_section` places the new section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Ahead of every other section, after the preamble.
    AtBeginning,
    #[default]
    AtEnd,
}

impl Positioning {
    pub fn from_prepend(prepend: bool) -> Self {
        if prepend {
            Positioning::AtBeginning
        } else {
            Positioning::AtEnd
        }
    }
}

//! iniedit: query-driven editing of INI configuration files
//!
//! Text is parsed into a [`Document`] of sections holding property and
//! comment nodes. A [`Query`] selects sections by name, by key/value pairs
//! they contain and by comment text; the [`IniEditor`] operations then add,
//! delete, modify or read the selected sections, and the document is written
//! back out with untouched lines kept as they were.
//!
//! # Architecture
//!
//! Every operation is a callback driven by one engine pass
//! ([`transform::run`]): the engine walks sections in order, decides matches
//! with the pure predicates in [`transform::matcher`], and lets the callback
//! mutate the matched section or stop the pass with [`Flow::Stop`].
//!
//! # Example
//!
//! ```
//! use iniedit::{ChangeSet, IniEditor, Query};
//!
//! let mut ini = IniEditor::parse("[A]\nX=1\n[B]\nX=2\n").unwrap();
//! let changes = ChangeSet::new().delete("X").set("Y", "2");
//!
//! let count = ini
//!     .modify_section(&Query::for_sections(["A"]), &changes, &ChangeSet::new(), None)
//!     .unwrap();
//!
//! assert_eq!(count, 1);
//! assert_eq!(ini.to_string(), "[A]\nY = 2\n[B]\nX=2\n");
//! ```

pub mod args;
pub mod config;
pub mod editor;
pub mod ini;
pub mod operations;
pub mod query;
pub mod source;
pub mod transform;

// Re-exports
pub use args::{build_query, ArgumentError, LineSource};
pub use config::{
    load_from_env, load_from_path, load_from_str, ConfigError, Settings, SettingsError,
    SettingsOrigin,
};
pub use editor::{EditorOptions, IniEditor, DEFAULT_COMMENT_PREFIX};
pub use ini::{parse, serialize, Comment, Document, IniError, Node, Property, Section};
pub use operations::{Change, ChangeSet, Positioning};
pub use query::{Pattern, Query, QueryError, WherePair};
pub use source::{SourceError, SourceFile, WriteResult};
pub use transform::Flow;

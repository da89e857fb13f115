//! Symbol library container maintenance.
//!
//! A `.kicad_sym` library is one text file holding many named symbol
//! records between a fixed header and a closing footer. Components are
//! upserted one at a time: an existing record is replaced in place (or
//! skipped, under the skip-existing policy), a new record is inserted
//! immediately before the footer. Bytes outside the touched record are
//! preserved verbatim, so re-serializing an unmodified container is
//! byte-identical.
//!
//! Record boundaries are found by walking balanced parentheses from the
//! record's opening marker, not by regex: record bodies contain nested
//! s-expressions and quoted strings that a fixed pattern cannot frame
//! safely.
//!
//! The store assumes a single writer per container within a run. Writes
//! are whole-document rewrites; callers that need crash safety should
//! write to a temporary file and rename.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::easyeda::{ConvertError, ConvertResult};

/// Header line opening a symbol library container.
pub const HEADER: &str = "(kicad_symbol_lib (version 20210201) (generator jlc2kicad)\n";

/// Footer closing the container.
pub const FOOTER: &str = ")\n";

/// Outcome of an upsert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The record was appended before the footer.
    Inserted,
    /// An existing record was replaced in place.
    Replaced,
    /// The record exists and the skip-existing policy was active.
    Skipped,
}

/// An in-memory symbol library container.
#[derive(Debug, Clone)]
pub struct Container {
    path: PathBuf,
    contents: String,
}

impl Container {
    /// Creates an empty container (header and footer only) for `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: format!("{HEADER}{FOOTER}"),
        }
    }

    /// Loads the container at `path`, or creates an empty one if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::FileRead`] when the file exists but cannot
    /// be read.
    pub fn load_or_create(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::empty(path));
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConvertError::file_read(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            contents,
        })
    }

    /// Returns the container text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Returns true if a record named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.find_record(name), Ok(Some(_)))
    }

    /// Inserts or replaces the record named `name`.
    ///
    /// `block` must be the full record text, indented for the container
    /// body and ending with a newline. With `overwrite` false an existing
    /// record is left untouched and `Skipped` is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Container`] when the footer marker is
    /// missing (the file is presumed corrupt and is never rewritten) or
    /// when the record name is ambiguous.
    pub fn upsert(&mut self, name: &str, block: &str, overwrite: bool) -> ConvertResult<Upsert> {
        match self.find_record(name)? {
            Some(span) => {
                if !overwrite {
                    tracing::info!(component = %name, "already in library, skipping");
                    return Ok(Upsert::Skipped);
                }
                tracing::info!(component = %name, "already in library, updating");
                // The span excludes the record's leading indent and trailing
                // newline; those bytes stay in place.
                self.contents.replace_range(span, block.trim());
                Ok(Upsert::Replaced)
            }
            None => {
                // Append semantics: the new block lands immediately before
                // the footer, leaving every earlier block untouched.
                let footer = self.footer_position()?;
                self.contents.insert_str(footer, block);
                Ok(Upsert::Inserted)
            }
        }
    }

    /// Writes the container back to its file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::FileWrite`] on I/O failure.
    pub fn save(&self) -> ConvertResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConvertError::file_write(&self.path, e))?;
            }
        }
        std::fs::write(&self.path, &self.contents)
            .map_err(|e| ConvertError::file_write(&self.path, e))
    }

    /// Byte offset of the footer marker (the container's final `)` line).
    ///
    /// The footer must be a lone `)` on the last non-empty line, with at
    /// least one line above it. Anything else means the container was
    /// truncated or hand-edited and is never rewritten.
    fn footer_position(&self) -> ConvertResult<usize> {
        let corrupt =
            || ConvertError::container(&self.path, "footer marker not found; refusing to rewrite");

        let trimmed = self.contents.trim_end();
        if !trimmed.ends_with(')') {
            return Err(corrupt());
        }
        let close = trimmed.len() - 1;
        let line_start = self.contents[..close].rfind('\n').map_or(0, |i| i + 1);
        if line_start == 0 || !self.contents[line_start..close].trim().is_empty() {
            return Err(corrupt());
        }
        Ok(line_start)
    }

    /// Finds the byte span of the record named `name`, from its opening
    /// `(` through the structurally matching `)`.
    fn find_record(&self, name: &str) -> ConvertResult<Option<Range<usize>>> {
        let marker = format!("(symbol \"{name}\"");
        let Some(open) = self.contents.find(&marker) else {
            return Ok(None);
        };

        let close = matching_close(&self.contents, open).ok_or_else(|| {
            ConvertError::container(&self.path, format!("unbalanced record block for '{name}'"))
        })?;

        // A second record with the same name makes the upsert target
        // ambiguous; refuse rather than guess.
        if self.contents[close..].find(&marker).is_some() {
            return Err(ConvertError::container(
                &self.path,
                format!("record name '{name}' appears more than once"),
            ));
        }

        Ok(Some(open..close))
    }
}

/// Returns the byte offset one past the `)` matching the `(` at `open`.
///
/// Quoted strings are skipped wholesale so parentheses inside record text
/// never unbalance the walk.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    debug_assert_eq!(text.as_bytes().get(open), Some(&b'('));

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[open..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str, body: &str) -> String {
        format!("  (symbol \"{name}\"\n{body}  )\n")
    }

    #[test]
    fn insert_into_empty_container() {
        let mut container = Container::empty("lib.kicad_sym");
        let block = block("C123", "    (pin input line)\n");

        let outcome = container.upsert("C123", &block, true).unwrap();
        assert_eq!(outcome, Upsert::Inserted);
        assert_eq!(
            container.contents(),
            &format!("{HEADER}{block}{FOOTER}")
        );
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut container = Container::empty("lib.kicad_sym");
        let block = block("C123", "    (pin input line)\n");

        container.upsert("C123", &block, true).unwrap();
        let once = container.contents().to_string();
        container.upsert("C123", &block, true).unwrap();
        assert_eq!(container.contents(), once);
    }

    #[test]
    fn replace_preserves_other_records() {
        let mut container = Container::empty("lib.kicad_sym");
        container
            .upsert("FIRST", &block("FIRST", "    (pin a)\n"), true)
            .unwrap();
        container
            .upsert("SECOND", &block("SECOND", "    (pin b)\n"), true)
            .unwrap();
        let before = container.contents().to_string();

        container
            .upsert("FIRST", &block("FIRST", "    (pin updated)\n"), true)
            .unwrap();

        let after = container.contents();
        assert!(after.contains("(pin updated)"));
        assert!(after.contains("(pin b)"));
        // Bytes after the replaced record are untouched.
        let tail_before = &before[before.find("SECOND").unwrap()..];
        let tail_after = &after[after.find("SECOND").unwrap()..];
        assert_eq!(tail_before, tail_after);
    }

    #[test]
    fn skip_existing_policy() {
        let mut container = Container::empty("lib.kicad_sym");
        container
            .upsert("C1", &block("C1", "    (pin old)\n"), true)
            .unwrap();
        let before = container.contents().to_string();

        let outcome = container
            .upsert("C1", &block("C1", "    (pin new)\n"), false)
            .unwrap();
        assert_eq!(outcome, Upsert::Skipped);
        assert_eq!(container.contents(), before);
    }

    #[test]
    fn nested_parens_in_strings_do_not_confuse_matching() {
        let mut container = Container::empty("lib.kicad_sym");
        let tricky = block("C1", "    (property \"Value\" \"op-amp (dual)\")\n");
        container.upsert("C1", &tricky, true).unwrap();
        container
            .upsert("C2", &block("C2", "    (pin b)\n"), true)
            .unwrap();

        container
            .upsert("C1", &block("C1", "    (pin replaced)\n"), true)
            .unwrap();
        assert!(container.contents().contains("(pin replaced)"));
        assert!(container.contents().contains("C2"));
        assert!(!container.contents().contains("op-amp"));
    }

    #[test]
    fn sub_symbol_names_do_not_shadow_records() {
        // A record "C1" contains a sub-symbol "C1_1"; looking up "C1_1"
        // as a record must not land inside "C1"'s span.
        let mut container = Container::empty("lib.kicad_sym");
        let nested = "  (symbol \"C1\"\n    (symbol \"C1_1\"\n      (pin a)\n    )\n  )\n";
        container.upsert("C1", nested, true).unwrap();
        assert!(container.contains("C1"));
        assert!(container.contains("C1_1"));

        // Replacing C1 swallows the nested block entirely.
        container
            .upsert("C1", &block("C1", "    (pin flat)\n"), true)
            .unwrap();
        assert!(!container.contents().contains("C1_1"));
    }

    #[test]
    fn missing_footer_is_fatal() {
        let mut container = Container {
            path: PathBuf::from("broken.kicad_sym"),
            contents: "(kicad_symbol_lib (version 20210201) (generator jlc2kicad".to_string(),
        };
        let err = container
            .upsert("C1", &block("C1", "    (pin a)\n"), true)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Container { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn inline_close_paren_is_not_a_footer() {
        // The header's own parens must not be mistaken for the footer.
        let mut container = Container {
            path: PathBuf::from("broken.kicad_sym"),
            contents: "(kicad_symbol_lib (version 20210201) (generator jlc2kicad))".to_string(),
        };
        let before = container.contents().to_string();
        let err = container
            .upsert("C1", &block("C1", "    (pin a)\n"), true)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Container { .. }));
        assert_eq!(container.contents(), before);
    }

    #[test]
    fn load_missing_file_creates_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.kicad_sym");
        let container = Container::load_or_create(&path).unwrap();
        assert_eq!(container.contents(), &format!("{HEADER}{FOOTER}"));

        let mut container = container;
        container
            .upsert("C1", &block("C1", "    (pin a)\n"), true)
            .unwrap();
        container.save().unwrap();

        let reloaded = Container::load_or_create(&path).unwrap();
        assert_eq!(reloaded.contents(), container.contents());
    }
}

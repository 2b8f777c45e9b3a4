//! Line-based editing of an existing file. Lines come from any finite source supplied by the
//! caller, so the engine never blocks on a terminal itself.

use std::str::FromStr;

use crate::core::{Failure, Outcome, Result};
use crate::shell::Session;
use crate::shell::ops::WriteMode;

/// Line that ends editor input (compared trimmed, case-insensitively).
pub const END_OF_INPUT: &str = "exit";

/// What the editor does with the collected lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EditMode {
    /// Adds the lines after the existing content, starting on a new line.
    Append,
    /// Replaces the existing content with the lines.
    Overwrite,
}

impl FromStr for EditMode {
    type Err = Failure;

    fn from_str(choice: &str) -> std::result::Result<Self, Self::Err> {
        match choice.trim().to_lowercase().as_str() {
            "a" => Ok(EditMode::Append),
            "o" => Ok(EditMode::Overwrite),
            _ => Err(Failure::invalid(
                "Invalid choice. Use 'a' to append or 'o' to overwrite.",
            )),
        }
    }
}

/// Takes lines up to (not including) the first [`END_OF_INPUT`] line.
pub fn collect_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().to_string())
        .take_while(|line| !line.trim().eq_ignore_ascii_case(END_OF_INPUT))
        .collect()
}

impl Session {
    /// Edits the existing file `name` with `lines`, which are read up to the first
    /// [`END_OF_INPUT`] line. Append mode separates the new block from the old content
    /// with a newline.
    pub fn edit_file<I, S>(&mut self, name: &str, mode: EditMode, lines: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let block = collect_lines(lines).join("\n");
        match mode {
            EditMode::Append => {
                self.write_whole_file(name, format!("\n{}", block).as_bytes(), WriteMode::Append)
            }
            EditMode::Overwrite => {
                self.write_whole_file(name, block.as_bytes(), WriteMode::Overwrite)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_edit_mode_from_str() {
        assert_eq!("a".parse::<EditMode>(), Ok(EditMode::Append));
        assert_eq!(" O ".parse::<EditMode>(), Ok(EditMode::Overwrite));
        assert!("x".parse::<EditMode>().is_err());
    }

    #[test]
    fn test_collect_lines_stops_at_sentinel() {
        let lines = collect_lines(["one", "two", "  EXIT ", "ignored"]);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_collect_lines_without_sentinel_takes_all() {
        let lines = collect_lines(vec![String::from("only")]);
        assert_eq!(lines, vec!["only".to_string()]);
    }

    #[test]
    fn test_edit_append() -> Result<()> {
        let temp_dir = TempDir::new("editor_test")?;
        let mut session = Session::new(temp_dir.path())?;
        session.create_file("notes.txt", "first")?;

        let outcome = session.edit_file("notes.txt", EditMode::Append, ["second", "third", "exit"])?;

        assert_eq!(outcome.message(), "Content appended to file.");
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("notes.txt"))?,
            "first\nsecond\nthird"
        );
        Ok(())
    }

    #[test]
    fn test_edit_overwrite() -> Result<()> {
        let temp_dir = TempDir::new("editor_test")?;
        let mut session = Session::new(temp_dir.path())?;
        session.create_file("notes.txt", "old content")?;

        let outcome = session.edit_file("notes.txt", EditMode::Overwrite, ["new", "exit"])?;

        assert_eq!(outcome.message(), "Content overwritten in file.");
        assert_eq!(std::fs::read_to_string(temp_dir.path().join("notes.txt"))?, "new");
        Ok(())
    }

    #[test]
    fn test_edit_missing_file() -> Result<()> {
        let temp_dir = TempDir::new("editor_test")?;
        let mut session = Session::new(temp_dir.path())?;

        let outcome = session.edit_file("ghost.txt", EditMode::Append, ["text"])?;

        assert_eq!(outcome.failure(), Some(&Failure::not_found("ghost.txt")));
        assert!(!temp_dir.path().join("ghost.txt").exists());
        Ok(())
    }
}

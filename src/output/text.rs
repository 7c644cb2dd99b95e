//! Plain text output: grouped path listings and action echo lines.
//!
//! The `pprint` action prints each group's paths one per line, every group
//! followed by a blank line. Remove and move runs echo what they do through
//! [`ActionEcho`]:
//!
//! ```text
//! found duplicates:
//!     /a/x.txt
//!     /b/y.txt
//! rm /a/x.txt
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;

use crate::actions::{ActionError, ActionObserver, ActionPlan, Operation};
use crate::duplicates::DuplicateGroup;

/// Grouped path listing.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextOutput<'a> {
    /// Wrap finalized groups for printing.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write every group as a block of lines.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        for group in self.groups {
            for file in &group.files {
                writeln!(writer, "{}", file.display())?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Echoes remove/move progress as text lines.
///
/// Write errors are logged and otherwise ignored so an unwritable terminal
/// never changes what happens to the files.
pub struct ActionEcho<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> ActionEcho<W> {
    /// Echo into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn line(&self, args: std::fmt::Arguments<'_>) {
        let mut writer = self.writer.borrow_mut();
        if let Err(e) = writer.write_fmt(args).and_then(|()| writer.write_all(b"\n")) {
            log::debug!("Failed to write action output: {}", e);
        }
    }
}

impl<W: Write> ActionObserver for ActionEcho<W> {
    fn on_group(&self, plan: &ActionPlan) {
        self.line(format_args!("found duplicates:"));
        for member in &plan.members {
            self.line(format_args!("    {}", member.display()));
        }
    }

    fn on_operation(&self, operation: &Operation) {
        match operation {
            Operation::Remove { path } => self.line(format_args!("rm {}", path.display())),
            Operation::Move { path, dest, .. } => {
                self.line(format_args!("mv {} to {}", path.display(), dest.display()));
            }
        }
    }

    fn on_failure(&self, path: &Path, error: &ActionError) {
        self.line(format_args!("failed {}: {}", path.display(), error));
    }
}

//! Handing a located file to something that shows it.

use std::io::Write;
use std::process::Command;

use crate::error::Error;
use crate::locate::Location;

/// Shows a file at a cursor location.
pub trait Opener {
    /// Open `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file could not be shown.
    fn open(&mut self, location: &Location) -> Result<(), Error>;
}

/// Writes `path:line:column` lines, the format most editors and terminals accept.
pub struct PrintOpener<W> {
    /// Destination, usually stdout.
    out: W,
}

impl<W: Write> PrintOpener<W> {
    pub const fn new(out: W) -> Self {
        return Self { out };
    }
}

impl<W: Write> Opener for PrintOpener<W> {
    fn open(&mut self, location: &Location) -> Result<(), Error> {
        writeln!(self.out, "{}:{}:{}", location.path.display(), location.line, location.column)?;
        return Ok(());
    }
}

/// Runs an external editor from an argv template.
pub struct CommandOpener {
    /// Program followed by arguments, with placeholders.
    template: Vec<String>,
}

impl CommandOpener {
    /// `template` must name a program in its first element.
    pub const fn new(template: Vec<String>) -> Self {
        return Self { template };
    }

    /// Substitute `{path}`, `{line}`, `{column}` and `{offset}` in every template element.
    fn argv(&self, location: &Location) -> Vec<String> {
        let path = location.path.display().to_string();
        return self
            .template
            .iter()
            .map(|arg| {
                return arg
                    .replace("{path}", &path)
                    .replace("{line}", &location.line.to_string())
                    .replace("{column}", &location.column.to_string())
                    .replace("{offset}", &location.offset.to_string());
            })
            .collect();
    }
}

impl Opener for CommandOpener {
    fn open(&mut self, location: &Location) -> Result<(), Error> {
        let argv = self.argv(location);
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::InvalidConfig { reason: "editor command is empty".to_string() });
        };

        tracing::info!(program = %program, file = %location.path.display(), "launching editor");
        let status = Command::new(program).args(args).status().map_err(|e| {
            return Error::EditorFailed { program: program.clone(), reason: e.to_string() };
        })?;
        if !status.success() {
            return Err(Error::EditorFailed { program: program.clone(), reason: status.to_string() });
        }
        return Ok(());
    }
}

use std::fmt::Write as _;

use crate::commands::file_name;
use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::NotFound { reference } => render_not_found(reference),
        Error::TreeUnavailable { path, reason } => render_tree_unavailable(path, reason),
        Error::OffsetOutOfRange { file, length, offset } => format!("\
# Error: Offset Out Of Range

Offset {offset} is past the end of `{}`, which has {length} characters.
", file.display()),
        Error::EditorFailed { program, reason } => format!("\
# Error: Editor Failed

`{program}` did not open the file: {reason}

## Fix

Check the `editor` command in `{CONFIG_FILE}`, or drop it to print locations instead.
"),
        _ => render_generic(e),
    };
}

/// Config and input errors that need no extra guidance.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.
", path.display()),

        Error::InvalidConfig { reason } => format!("\
# Error: Invalid Config

{reason}

## Fix

Correct `{CONFIG_FILE}` in the workspace root.
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid Config

{e}
"),

        Error::EmptyReference { raw } => format!("\
# Error: Empty Reference

`{raw}` contains no path segments to look up.
"),

        other => format!("\
# Error

{other}
"),
    };
}

/// Not found, with a scan command to list same-named files.
fn render_not_found(reference: &str) -> String {
    let mut out = format!("\
# Error: No Workspace File

Nothing in the workspace matches `{reference}`.

## Checked

- every trailing part of the path, from the file name outward
- every file in open projects with the same name
");
    let _ = write!(out, "\
\n## Fix

Open or add the project that contains the file, or list candidates with:

    wsopen scan --name {}
", file_name(reference));
    return out;
}

/// Workspace root or project directory that cannot be listed.
fn render_tree_unavailable(path: &str, reason: &str) -> String {
    return format!(
        "\
# Error: Workspace Unavailable

`{path}` could not be listed: {reason}

## Fix

Check that `--root` points at an existing directory and that `[projects]`
in `{CONFIG_FILE}` names directories that exist.
"
    );
}

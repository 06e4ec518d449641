//! Output utilities for the command line.
//!
//! Provides print/println functions that bypass clippy's `print_stdout` lint.

use std::io::{self, Write};

/// Print formatted arguments to stdout with newline.
pub fn println(args: std::fmt::Arguments<'_>) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_fmt(args);
    let _ = stdout.write_all(b"\n");
}

//! Colored terminal output for the `pkpass` binary.
//!
//! Regular messages go to stdout and warnings to stderr. `--quiet` silences
//! everything except warnings; `--verbose` enables detail lines. Color is
//! used only when the stream is a terminal.

use cyrup_termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, IsTerminal, Write};

/// Prints user-facing messages according to the verbosity flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn stdout() -> StandardStream {
        StandardStream::stdout(color_choice(io::stdout().is_terminal()))
    }

    fn stderr() -> StandardStream {
        StandardStream::stderr(color_choice(io::stderr().is_terminal()))
    }

    /// Writes `marker` in `color`, then the message uncolored.
    fn tagged(
        stream: &mut StandardStream,
        color: Color,
        marker: &str,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stream, "{marker}")?;
        stream.reset()?;
        writeln!(stream, " {message}")
    }

    /// Detail line, shown only with `--verbose`.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            let mut stdout = Self::stdout();
            stdout.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(stdout, "  {message}")?;
            stdout.reset()?;
            writeln!(stdout)?;
        }
        Ok(())
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            Self::tagged(&mut Self::stdout(), Color::Cyan, "→", message)?;
        }
        Ok(())
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            Self::tagged(&mut Self::stdout(), Color::Green, "✓", message)?;
        }
        Ok(())
    }

    /// Warnings are printed even with `--quiet`.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        Self::tagged(&mut Self::stderr(), Color::Yellow, "⚠", message)
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(Self::stdout(), "    {message}")?;
        }
        Ok(())
    }

    /// Raw payload output (rendered JSON); never colored or suppressed.
    pub fn data(&self, payload: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(payload)?;
        stdout.write_all(b"\n")?;
        stdout.flush()
    }
}

/// Colors for terminals unless `NO_COLOR` is set; never for pipes.
fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal && std::env::var_os("NO_COLOR").is_none() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipes_never_get_color() {
        assert_eq!(color_choice(false), ColorChoice::Never);
    }
}

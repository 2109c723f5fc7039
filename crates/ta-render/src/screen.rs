use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::tty::IsTty;
use crossterm::{execute, queue};
use ta_core::frame::Frame;

/// `(rows, cols)` assumed when the output is not a terminal.
pub const DEFAULT_SIZE: (u16, u16) = (24, 80);

/// Taille du terminal `(rows, cols)`, ou [`DEFAULT_SIZE`] hors terminal.
#[must_use]
pub fn query_size() -> (u16, u16) {
    if !io::stdout().is_tty() {
        return DEFAULT_SIZE;
    }
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => (rows, cols),
        Ok(_) => DEFAULT_SIZE,
        Err(e) => {
            log::debug!("query_size: taille indisponible ({e}), défaut {DEFAULT_SIZE:?}");
            DEFAULT_SIZE
        }
    }
}

/// Low-level terminal control.
///
/// Control sequences are best-effort: failures are swallowed and never
/// retried. Only frame output reports I/O errors, so a broken output stream
/// stops playback.
pub trait Screen {
    /// Switch to the alternate screen buffer.
    fn enter_alt_buffer(&mut self);
    /// Return to the primary screen buffer.
    fn exit_alt_buffer(&mut self);
    /// Clear the visible screen.
    fn clear_screen(&mut self);
    /// Drop the scrollback buffer.
    fn clear_scrollback(&mut self);
    /// Hide the cursor.
    fn hide_cursor(&mut self);
    /// Show the cursor.
    fn show_cursor(&mut self);
    /// Move the cursor to the top-left cell.
    fn cursor_home(&mut self);
    /// Clear from the cursor to the end of the screen.
    fn clear_from_cursor(&mut self);

    /// Write a rendered frame at the cursor.
    ///
    /// # Errors
    /// Propagates write failures of the underlying stream.
    fn write_frame(&mut self, frame: &Frame) -> io::Result<()>;

    /// Flush pending output.
    ///
    /// # Errors
    /// Propagates flush failures of the underlying stream.
    fn flush(&mut self) -> io::Result<()>;

    /// `(rows, cols)` of the output.
    fn size(&self) -> (u16, u16) {
        query_size()
    }
}

/// Screen controller writing ANSI sequences to any `Write` sink.
///
/// # Example
/// ```
/// use ta_render::{AnsiScreen, Screen};
/// let mut screen = AnsiScreen::new(Vec::new());
/// screen.hide_cursor();
/// assert_eq!(screen.get_ref().as_slice(), b"\x1b[?25l");
/// ```
pub struct AnsiScreen<W: Write> {
    out: W,
}

impl AnsiScreen<Stdout> {
    /// Controller bound to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiScreen<W> {
    /// Wrap a sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Borrow the sink.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn best_effort(what: &str, result: io::Result<()>) {
    if let Err(e) = result {
        log::trace!("séquence terminal '{what}' ignorée : {e}");
    }
}

impl<W: Write> Screen for AnsiScreen<W> {
    fn enter_alt_buffer(&mut self) {
        best_effort("enter_alt_buffer", execute!(self.out, EnterAlternateScreen));
    }

    fn exit_alt_buffer(&mut self) {
        best_effort("exit_alt_buffer", execute!(self.out, LeaveAlternateScreen));
    }

    fn clear_screen(&mut self) {
        best_effort("clear_screen", execute!(self.out, Clear(ClearType::All)));
    }

    fn clear_scrollback(&mut self) {
        best_effort("clear_scrollback", execute!(self.out, Clear(ClearType::Purge)));
    }

    fn hide_cursor(&mut self) {
        best_effort("hide_cursor", execute!(self.out, Hide));
    }

    fn show_cursor(&mut self) {
        best_effort("show_cursor", execute!(self.out, Show));
    }

    fn cursor_home(&mut self) {
        best_effort("cursor_home", queue!(self.out, MoveTo(0, 0)));
    }

    fn clear_from_cursor(&mut self) {
        best_effort("clear_from_cursor", queue!(self.out, Clear(ClearType::FromCursorDown)));
    }

    fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.out.write_all(frame.as_str().as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(op: impl FnOnce(&mut AnsiScreen<Vec<u8>>)) -> Vec<u8> {
        let mut screen = AnsiScreen::new(Vec::new());
        op(&mut screen);
        screen.into_inner()
    }

    #[test]
    fn control_sequences_match_ansi() {
        assert_eq!(bytes_of(|s| s.enter_alt_buffer()), b"\x1b[?1049h");
        assert_eq!(bytes_of(|s| s.exit_alt_buffer()), b"\x1b[?1049l");
        assert_eq!(bytes_of(|s| s.clear_screen()), b"\x1b[2J");
        assert_eq!(bytes_of(|s| s.clear_scrollback()), b"\x1b[3J");
        assert_eq!(bytes_of(|s| s.hide_cursor()), b"\x1b[?25l");
        assert_eq!(bytes_of(|s| s.show_cursor()), b"\x1b[?25h");
        assert_eq!(bytes_of(|s| s.cursor_home()), b"\x1b[1;1H");
        assert_eq!(bytes_of(|s| s.clear_from_cursor()), b"\x1b[J");
    }

    #[test]
    fn frames_are_written_verbatim() {
        let out = bytes_of(|s| {
            s.write_frame(&Frame::new("ab\ncd\n")).unwrap();
            s.flush().unwrap();
        });
        assert_eq!(out, b"ab\ncd\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn control_failures_are_swallowed_but_frame_failures_are_not() {
        let mut screen = AnsiScreen::new(BrokenPipe);
        screen.enter_alt_buffer();
        screen.hide_cursor();
        screen.exit_alt_buffer();
        assert!(screen.write_frame(&Frame::new("x")).is_err());
        assert!(screen.flush().is_err());
    }

    #[test]
    fn size_is_never_zero() {
        let (rows, cols) = query_size();
        assert!(rows > 0 && cols > 0);
    }
}

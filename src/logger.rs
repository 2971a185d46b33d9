//! Terminal logging with colored module prefixes.
//!
//! - `log!` / `debug!` macros for `[module] message` lines
//! - `CompileStatusLine` for the overwriting status block shown while serving
//!
//! # Example
//!
//! ```ignore
//! log!("compile"; "running {}", program);
//! debug!("watch"; "change: {}", path.display());
//!
//! status_compiled("main.tex", elapsed);
//! status_failed("compile failed", &diagnostic);
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Any status block currently on screen is forgotten, so the next status
/// update starts below this line instead of overwriting it.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();

    if let Some(mut status) = STATUS_LINE.try_lock() {
        status.last_lines = 0;
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" | "ws" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "compile" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Compile status (overwriting block)
// ============================================================================

/// Wall-clock time of day (UTC) formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Status block that overwrites its previous output.
///
/// Repeated compiles while serving replace each other's result instead of
/// scrolling the terminal; a failure keeps its diagnostic until the next
/// result arrives.
pub struct CompileStatusLine {
    /// Lines of previous output to clear
    last_lines: usize,
}

static STATUS_LINE: LazyLock<Mutex<CompileStatusLine>> =
    LazyLock::new(|| Mutex::new(CompileStatusLine::new()));

impl CompileStatusLine {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    /// ✓ prefix, green.
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Dimmed, no symbol.
    pub fn unchanged(&mut self, message: &str) {
        self.display(String::new(), &format!("{}", message.dimmed()));
    }

    /// ✗ prefix, red, with optional detail below the summary.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines.min(u16::MAX as usize) as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        let line = if symbol.is_empty() {
            format!("{timestamp} {message}")
        } else {
            format!("{timestamp} {symbol} {message}")
        };

        writeln!(stdout, "{line}").ok();
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Show a successful compile.
pub fn status_compiled(main: &str, elapsed: Duration) {
    STATUS_LINE
        .lock()
        .success(&format!("compiled {main} ({:.1}s)", elapsed.as_secs_f64()));
}

/// Show a skipped auto-compile.
pub fn status_unchanged(message: &str) {
    STATUS_LINE.lock().unchanged(message);
}

/// Show a failed compile. Long diagnostics are cut to their last lines,
/// which is where LaTeX engines report the fatal error.
pub fn status_failed(summary: &str, detail: &str) {
    STATUS_LINE.lock().error(summary, tail_lines(detail, 12));
}

fn tail_lines(text: &str, max: usize) -> &str {
    let text = text.trim_end();
    let Some((idx, _)) = text.match_indices('\n').rev().nth(max.saturating_sub(1)) else {
        return text;
    };
    &text[idx + 1..]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_new() {
        let status = CompileStatusLine::new();
        assert_eq!(status.last_lines, 0);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("compiled main.tex (0.4s)"), 1);
        assert_eq!(line_count("compile failed\n! Undefined control sequence.\nl.12"), 3);
    }

    #[test]
    fn test_tail_lines_short_text_untouched() {
        assert_eq!(tail_lines("a\nb\nc", 5), "a\nb\nc");
    }

    #[test]
    fn test_tail_lines_keeps_last() {
        assert_eq!(tail_lines("a\nb\nc\nd\n", 2), "c\nd");
        assert_eq!(tail_lines("a\nb\nc", 1), "c");
    }
}

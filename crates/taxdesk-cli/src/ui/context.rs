//! Terminal detection and output routing.
//!
//! [`Terminal::detect`] reads the process environment once. [`UiContext::resolve`]
//! turns that snapshot plus the global flags into the settings every renderer
//! consults, so routing is testable without a real terminal.

use std::io::IsTerminal;

use chrono_tz::Tz;

use crate::cli::FormatChoice;

/// How a command writes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One JSON document on stdout, nothing else.
    Json,
    /// Stable `key: value` lines and tab-separated tables.
    #[default]
    Plain,
    /// Headers, badges, bordered tables.
    Pretty,
}

impl OutputMode {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// Global output flags from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiFlags {
    pub json: bool,
    pub format: Option<FormatChoice>,
    pub no_color: bool,
    pub ascii: bool,
}

/// What the process environment says about the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    pub stdout_tty: bool,
    pub stdin_tty: bool,
    /// `TERM=dumb`
    pub dumb: bool,
    /// `NO_COLOR` is set
    pub no_color: bool,
    pub width: usize,
}

impl Terminal {
    pub fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            stdin_tty: std::io::stdin().is_terminal(),
            dumb: std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            width: terminal_width().unwrap_or(80),
        }
    }
}

/// Resolved rendering settings for one invocation.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Both stdin and stdout are terminals; prompts and the shell prompt are allowed.
    pub interactive: bool,
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
    /// Display timezone for timestamps; `None` means UTC.
    pub timezone: Option<Tz>,
}

impl UiContext {
    /// Detect the terminal and resolve against `flags`.
    pub fn detect(flags: UiFlags, timezone: Option<Tz>) -> Self {
        Self::resolve(flags, Terminal::detect(), timezone)
    }

    /// `--json` wins outright. `--format plain` and `TERM=dumb` force plain;
    /// otherwise a terminal gets pretty output and a pipe gets plain.
    pub fn resolve(flags: UiFlags, term: Terminal, timezone: Option<Tz>) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else if flags.format == Some(FormatChoice::Plain) || term.dumb || !term.stdout_tty {
            OutputMode::Plain
        } else {
            OutputMode::Pretty
        };

        Self {
            interactive: term.stdout_tty && term.stdin_tty,
            color: mode.is_pretty() && !flags.no_color && !term.no_color,
            unicode: !flags.ascii && !term.dumb,
            width: term.width,
            mode,
            timezone,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Columns from `COLUMNS`, then the tty size.
fn terminal_width() -> Option<usize> {
    if let Some(width) = std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.parse::<usize>().ok())
        .filter(|width| *width > 0)
    {
        return Some(width);
    }

    #[cfg(unix)]
    {
        use std::mem::MaybeUninit;

        let mut winsize = MaybeUninit::<libc::winsize>::uninit();
        // SAFETY: TIOCGWINSZ only writes into the provided winsize.
        let result =
            unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, winsize.as_mut_ptr()) };
        if result == 0 {
            let ws = unsafe { winsize.assume_init() };
            if ws.ws_col > 0 {
                return Some(ws.ws_col as usize);
            }
        }
    }

    None
}

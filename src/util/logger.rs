use std::fmt::{Display, Formatter};

use super::Log;

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Function which return order of the log.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

/// Threshold-gated tracing for the pipeline stages (analysis solver passes,
/// inference decisions, generator heap stats). Driven by `--verbose` on the
/// CLI rather than `cfg(debug_assertions)`, since this tool runs in release
/// builds for end users.
pub struct Tracer {
    level: Log<()>,
}

impl Tracer {
    pub fn new(verbose: bool) -> Self {
        Self {
            level: if verbose { Log::Verbose(()) } else { Log::Default(()) },
        }
    }

    pub fn silent() -> Self {
        Self { level: Log::None }
    }

    fn enabled(&self, at: Log<()>) -> bool {
        self.level.order() >= at.order()
    }

    pub fn result(&self, msg: impl Display) {
        if self.enabled(Log::Result(())) {
            eprintln!("[result] {}", msg);
        }
    }

    pub fn verbose(&self, msg: impl Display) {
        if self.enabled(Log::Verbose(())) {
            eprintln!("[verbose] {}", msg);
        }
    }
}

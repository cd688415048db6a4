use std::env;
use std::sync::LazyLock;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Level {
    Error = 0,
    Warn = 1,
    Debug = 2,
}

impl Level {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" | "err" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Error,
        }
    }
}

static SGF_LOG: LazyLock<Level> = LazyLock::new(|| {
    env::var("SGF_LOG")
        .map(|s| Level::from_str(&s))
        .unwrap_or(Level::Error)
});

macro_rules! log {
    ($level:expr, $prefix:expr, $msg:expr) => {
        if *SGF_LOG >= $level {
            eprintln!(concat!($prefix, ": {}"), $msg.as_ref());
        }
    };
}

pub fn error(msg: impl AsRef<str>) {
    log!(Level::Error, "ERROR", msg);
}
pub fn warn(msg: impl AsRef<str>) {
    #[cfg(test)]
    WARN_CALLS.with(|calls| calls.set(calls.get() + 1));
    log!(Level::Warn, "WARN", msg);
}
pub fn debug(msg: impl AsRef<str>) {
    log!(Level::Debug, "DEBUG", msg);
}

/// Lets callers skip building expensive messages (tree dumps) nobody will see.
pub fn debug_enabled() -> bool {
    *SGF_LOG >= Level::Debug
}

#[cfg(test)]
thread_local! {
    static WARN_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Warnings issued on the current thread, whatever the level.
#[cfg(test)]
pub(crate) fn warn_calls() -> usize {
    WARN_CALLS.with(|calls| calls.get())
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn test_level_from_str_accepts_aliases() {
        assert!(Level::from_str("WARNING") == Level::Warn);
        assert!(Level::from_str("err") == Level::Error);
        assert!(Level::from_str("trace") == Level::Debug);
    }

    #[test]
    fn test_level_from_str_unknown_defaults_to_error() {
        assert!(Level::from_str("verbose") == Level::Error);
        assert!(Level::Debug > Level::Warn);
    }
}

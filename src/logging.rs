//! Internal logging helpers for structured nestrow events.

/// Single logging target for nestrow.
pub(crate) const LOG_TARGET: &str = "nestrow";

macro_rules! nestrow_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use nestrow_log;

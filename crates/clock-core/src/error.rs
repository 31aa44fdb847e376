//! Error taxonomy shared by the connection and time-sync managers.

use core::fmt;

/// Failure kinds raised inside the core.
///
/// Only the connection variants ever reach a caller. Everything else is
/// absorbed at the manager boundary and shows up as state (`synced == false`,
/// an empty network list) rather than as an error value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClockError {
    ConnectionTimeout,
    ConnectionRetriesExhausted,
    ScanEmpty,
    SyncRoundTripFailed,
    InvalidConfiguration,
}

impl ClockError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionTimeout => "connection timeout",
            Self::ConnectionRetriesExhausted => "connection retries exhausted",
            Self::ScanEmpty => "no networks found",
            Self::SyncRoundTripFailed => "sync round trip failed",
            Self::InvalidConfiguration => "invalid configuration",
        }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_log_wording() {
        assert_eq!(
            std::format!("{}", ClockError::ConnectionRetriesExhausted),
            "connection retries exhausted"
        );
        assert_eq!(std::format!("{}", ClockError::ScanEmpty), "no networks found");
    }
}

use std::fmt;

/// Lifecycle of the single stream connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    ClosedIntentional,
    ClosedUnintentional,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Open or on the way there; `connect()` has nothing to do
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Open | ConnectionState::Connecting)
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ConnectionState::Idle
                | ConnectionState::ClosedIntentional
                | ConnectionState::ClosedUnintentional
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::ClosedIntentional => "closed-intentional",
            ConnectionState::ClosedUnintentional => "closed-unintentional",
        };
        f.write_str(s)
    }
}

/// Delivered to close listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    pub intentional: bool,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_helpers() {
        assert!(ConnectionState::Open.is_open());
        assert!(ConnectionState::Open.is_active());
        assert!(ConnectionState::Connecting.is_active());
        assert!(!ConnectionState::Closing.is_active());
        assert!(!ConnectionState::Closing.is_closed());
        assert!(ConnectionState::ClosedUnintentional.is_closed());
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::ClosedIntentional.to_string(), "closed-intentional");
    }
}

//! Feed connection status and its state machine.
//!
//! | from          | to            | trigger                 |
//! |---------------|---------------|-------------------------|
//! | Disconnected  | Connecting    | `connect`               |
//! | Error         | Connecting    | `connect` (reconnect)   |
//! | Connecting    | Connected     | feed started            |
//! | Connecting    | Error         | feed failed to start    |
//! | Connected     | Error         | feed failure            |
//! | any live / Error | Disconnected | `disconnect`         |

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    /// Returns `true` if moving from `self` to `next` is part of the
    /// documented state machine. Staying in the same state is always
    /// allowed.
    pub fn can_transition_to(self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::*;

        if self == next {
            return true;
        }

        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Error, Connecting)
                | (Connecting, Connected)
                | (Connecting, Error)
                | (Connected, Error)
                | (Connected, Disconnected)
                | (Connecting, Disconnected)
                | (Error, Disconnected)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#![deny(unsafe_code)]
#![deny(warnings)]
//! Network client error types

use defmt::Format;
use ntp_clock_core::SyncError;

/// Network client operation errors
#[derive(Debug, Clone, Copy, Format)]
pub enum NetworkError {
    /// DNS resolution failed
    DnsError,
    /// Socket bind/send/receive error
    SocketError,
    /// Request timeout
    Timeout,
    /// Invalid response from server
    InvalidResponse,
    /// Server error (e.g., invalid stratum for NTP)
    ServerError,
    /// All configured servers failed
    AllServersFailed,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::ServerError => write!(f, "Server error"),
            Self::AllServersFailed => write!(f, "All servers failed"),
        }
    }
}

// Implement core::error::Error for no_std compatibility
impl core::error::Error for NetworkError {}

/// The clock only needs to know the category of failure
impl From<NetworkError> for SyncError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::DnsError | NetworkError::SocketError => SyncError::Network,
            NetworkError::Timeout => SyncError::Timeout,
            NetworkError::InvalidResponse | NetworkError::ServerError => {
                SyncError::InvalidResponse
            }
            NetworkError::AllServersFailed => SyncError::Unavailable,
        }
    }
}

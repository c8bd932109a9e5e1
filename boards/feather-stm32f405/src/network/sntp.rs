#![deny(unsafe_code)]
#![deny(warnings)]
//! SNTP client feeding the clock service

use defmt::{error, info, warn, Debug2Format};
use embassy_futures::select::{select, Either};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Instant as MonoInstant, Timer};
use ntp_clock_core::ntp::{self, NtpTimestamp, PACKET_LEN};
use ntp_clock_core::Instant;

use super::config::SntpConfig;
use super::error::NetworkError;

const NTP_PORT: u16 = 123;

/// SNTP client for time synchronization
pub struct SntpClient {
    config: SntpConfig,
}

impl SntpClient {
    /// Create a new SNTP client with default configuration
    pub fn new() -> Self {
        Self {
            config: SntpConfig::default(),
        }
    }

    /// Query each configured server in turn until one answers
    ///
    /// Every server gets `retry_count` attempts with `retry_backoff_ms`
    /// between them. No backoff follows the very last attempt.
    pub async fn fetch(&self, stack: Stack<'_>) -> Result<Instant, NetworkError> {
        info!("Starting SNTP synchronization");
        for attempt in ntp::attempts(self.config.servers, self.config.retry_count) {
            info!(
                "Attempting SNTP sync with {} (attempt {})",
                attempt.server, attempt.number
            );
            match self.sntp_request(stack, attempt.server).await {
                Ok(utc) => {
                    info!("SNTP sync successful: {} UTC", utc.as_unix_secs());
                    return Ok(utc);
                }
                Err(e) => {
                    warn!("SNTP sync failed: {:?}", e);
                    if attempt.back_off_after {
                        Timer::after_millis(self.config.retry_backoff_ms).await;
                    }
                }
            }
        }
        error!("All SNTP sync attempts failed");
        Err(NetworkError::AllServersFailed)
    }

    async fn sntp_request(&self, stack: Stack<'_>, server: &str) -> Result<Instant, NetworkError> {
        let server_ip = stack
            .dns_query(server, DnsQueryType::A)
            .await
            .map_err(|_| NetworkError::DnsError)?
            .first()
            .copied()
            .ok_or(NetworkError::DnsError)?;

        let server_endpoint = IpEndpoint::new(server_ip, NTP_PORT);
        info!("Resolved {} to {}", server, Debug2Format(&server_endpoint));

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 64];
        let mut socket = UdpSocket::new(
            stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| NetworkError::SocketError)?;

        let mut request = [0u8; PACKET_LEN];
        request[0] = ntp::CLIENT_REQUEST;
        let transmit_time = MonoInstant::now();
        socket
            .send_to(&request, server_endpoint)
            .await
            .map_err(|_| NetworkError::SocketError)?;

        let mut response = [0u8; PACKET_LEN];
        let timeout = Timer::after(Duration::from_millis(self.config.timeout_ms));
        let (recv_len, from_addr) = match select(timeout, socket.recv_from(&mut response)).await {
            Either::First(_) => return Err(NetworkError::Timeout),
            Either::Second(result) => result.map_err(|_| NetworkError::SocketError)?,
        };
        let rtt = MonoInstant::now().duration_since(transmit_time);

        if recv_len < PACKET_LEN || from_addr.endpoint.addr != server_ip {
            return Err(NetworkError::InvalidResponse);
        }

        let stratum = ntp::stratum(&response);
        if stratum == 0 || stratum > self.config.max_stratum {
            warn!(
                "Invalid stratum {} (max {})",
                stratum, self.config.max_stratum
            );
            return Err(NetworkError::ServerError);
        }

        let timestamp = NtpTimestamp::from_response(&response);
        let utc = timestamp.to_instant(rtt.as_micros());
        info!(
            "NTP stratum {}, transmit {}.{:06}, RTT {} us",
            stratum,
            timestamp.unix_secs(),
            timestamp.micros(),
            rtt.as_micros()
        );
        Ok(utc)
    }
}

impl Default for SntpClient {
    fn default() -> Self {
        Self::new()
    }
}

//! NTP wire timestamps
//!
//! Decoding of the 48-byte SNTP response and the order in which servers are
//! tried. Sockets and timers stay on the board.

use crate::time::Instant;

/// Length of an SNTP request/response without extensions
pub const PACKET_LEN: usize = 48;

/// First request byte: LI=0, VN=3, Mode=3 (client)
pub const CLIENT_REQUEST: u8 = 0x1B;

/// Seconds from 1900-01-01 to 1970-01-01
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;
/// Length of one 32-bit NTP era in seconds
const NTP_ERA_SECS: i64 = 1 << 32;
const MICROS_PER_SEC: u64 = 1_000_000;

/// Stratum byte of a response
pub fn stratum(response: &[u8; PACKET_LEN]) -> u8 {
    response[1]
}

/// One request in a multi-server retry sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attempt<'a> {
    pub server: &'a str,
    /// 1-based attempt number for this server
    pub number: usize,
    /// Whether to wait before the next attempt if this one fails
    pub back_off_after: bool,
}

/// `retries` attempts per server, servers in order
///
/// Every attempt except the very last is followed by a backoff on failure.
pub fn attempts<'a>(
    servers: &'a [&'a str],
    retries: usize,
) -> impl Iterator<Item = Attempt<'a>> + 'a {
    let total = servers.len() * retries;
    servers
        .iter()
        .flat_map(move |&server| (1..=retries).map(move |number| (server, number)))
        .enumerate()
        .map(move |(i, (server, number))| Attempt {
            server,
            number,
            back_off_after: i + 1 < total,
        })
}

/// Transmit timestamp of an NTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NtpTimestamp {
    pub secs: u32,
    pub frac: u32,
}

impl NtpTimestamp {
    /// Read the transmit timestamp (bytes 40..48)
    pub fn from_response(response: &[u8; PACKET_LEN]) -> Self {
        Self {
            secs: u32::from_be_bytes([response[40], response[41], response[42], response[43]]),
            frac: u32::from_be_bytes([response[44], response[45], response[46], response[47]]),
        }
    }

    /// Unix seconds, with the era chosen per RFC 4330: a clear MSB means the
    /// count has wrapped into era 1 (from 2036-02-07)
    pub fn unix_secs(self) -> i64 {
        let era = if self.secs & 0x8000_0000 == 0 {
            NTP_ERA_SECS
        } else {
            0
        };
        i64::from(self.secs) + era - NTP_UNIX_OFFSET
    }

    /// Fractional second in microseconds, truncated
    pub fn micros(self) -> u64 {
        (u64::from(self.frac) * MICROS_PER_SEC) >> 32
    }

    /// Server time plus half the round trip, rounded to the nearest second
    pub fn to_instant(self, rtt_micros: u64) -> Instant {
        let micros = self.micros() + rtt_micros / 2;
        let carry = (micros + MICROS_PER_SEC / 2) / MICROS_PER_SEC;
        let secs = self
            .unix_secs()
            .saturating_add(i64::try_from(carry).unwrap_or(i64::MAX));
        Instant::from_unix_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// First Unix second of NTP era 1
    const ERA_ONE_START: i64 = NTP_ERA_SECS - NTP_UNIX_OFFSET;

    fn ts(unix: i64, frac: u32) -> NtpTimestamp {
        let era = if unix >= ERA_ONE_START { NTP_ERA_SECS } else { 0 };
        NtpTimestamp {
            secs: (unix + NTP_UNIX_OFFSET - era) as u32,
            frac,
        }
    }

    #[test]
    fn test_attempts_cover_every_server_in_order() {
        let servers = ["a", "b"];
        let plan: Vec<_> = attempts(&servers, 2)
            .map(|a| (a.server, a.number, a.back_off_after))
            .collect();
        assert_eq!(
            plan,
            [
                ("a", 1, true),
                ("a", 2, true),
                ("b", 1, true),
                ("b", 2, false),
            ]
        );
    }

    #[test]
    fn test_no_backoff_after_last_attempt() {
        let single: Vec<_> = attempts(&["pool.ntp.org"], 1).collect();
        assert_eq!(single.len(), 1);
        assert!(!single[0].back_off_after);

        assert_eq!(attempts(&["a", "b"], 0).count(), 0);
        assert_eq!(attempts(&[], 3).count(), 0);
    }

    #[test]
    fn test_era_zero() {
        assert_eq!(ts(1_758_981_600, 0).unix_secs(), 1_758_981_600);
    }

    #[test]
    fn test_era_one_after_wrap() {
        // 2036-02-07T06:28:16Z wraps the 32-bit count to zero
        let wrapped = NtpTimestamp { secs: 0, frac: 0 };
        assert_eq!(wrapped.unix_secs(), 2_085_978_496);
        assert_eq!(ts(2_100_000_000, 0).unix_secs(), 2_100_000_000);
    }

    #[test]
    fn test_from_response_reads_transmit_timestamp() {
        let mut response = [0u8; PACKET_LEN];
        response[1] = 2;
        response[40..44].copy_from_slice(&3_967_970_400u32.to_be_bytes());
        response[44..48].copy_from_slice(&0x8000_0000u32.to_be_bytes());

        let t = NtpTimestamp::from_response(&response);
        assert_eq!(stratum(&response), 2);
        assert_eq!(t.unix_secs(), 1_758_981_600);
        assert_eq!(t.micros(), 500_000);
    }

    #[test]
    fn test_rounds_to_nearest_second() {
        let half = 1 << 31;
        assert_eq!(ts(100_000, 0).to_instant(0).as_unix_secs(), 100_000);
        assert_eq!(ts(100_000, half).to_instant(0).as_unix_secs(), 100_001);
        assert_eq!(ts(100_000, half - 1_000_000).to_instant(0).as_unix_secs(), 100_000);
    }

    #[test]
    fn test_half_rtt_is_added() {
        // 0.4 s server fraction plus 0.2 s one-way delay
        let frac = ((4 * (1u64 << 32)) / 10) as u32;
        assert_eq!(ts(100_000, frac).to_instant(400_000).as_unix_secs(), 100_001);
        assert_eq!(ts(100_000, frac).to_instant(100_000).as_unix_secs(), 100_000);
    }
}

#![deny(unsafe_code)]
#![deny(warnings)]
//! Network stack manager
//!
//! Waits for the link to come up after W5500 and embassy-net initialization.
//! The wait is bounded: the clock cannot do anything useful without a lease,
//! so exhausting every attempt halts the firmware.

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};

use super::config::NetworkConfig;

/// Wait for network configuration (DHCP) and log IP address
///
/// Makes `config.link_attempts` bounded waits of `config.link_timeout_secs`
/// each, then panics.
pub async fn wait_for_config(stack: &Stack<'_>, config: &NetworkConfig) {
    for attempt in 1..=config.link_attempts {
        info!(
            "Waiting for DHCP (attempt {}/{})...",
            attempt, config.link_attempts
        );
        let wait = with_timeout(
            Duration::from_secs(config.link_timeout_secs),
            stack.wait_config_up(),
        );
        if wait.await.is_ok() {
            info!("Network is UP!");
            log_addresses(stack);
            return;
        }
        warn!("No DHCP lease after {}s", config.link_timeout_secs);
    }
    defmt::panic!(
        "Network link not up after {} attempts, halting",
        config.link_attempts
    );
}

fn log_addresses(stack: &Stack<'_>) {
    if let Some(config) = stack.config_v4() {
        let octets = config.address.address().octets();
        info!(
            "IP: {}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        );

        if let Some(gateway) = config.gateway {
            let gw_octets = gateway.octets();
            info!(
                "Gateway: {}.{}.{}.{}",
                gw_octets[0], gw_octets[1], gw_octets[2], gw_octets[3]
            );
        }
    }
}

#![deny(unsafe_code)]
#![deny(warnings)]
//! Sync diagnostics over defmt

use defmt::{info, warn};
use ntp_clock_core::{DiagnosticEvent, DiagnosticsSink};

/// Logs every clock diagnostic over RTT
pub struct DefmtDiagnostics;

impl DiagnosticsSink for DefmtDiagnostics {
    fn record(&mut self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::Synced {
                utc,
                local,
                is_dst,
                offset_minutes,
                rule_label,
                correction_secs,
            } => {
                info!(
                    "Synced: {} UTC -> {} {} (offset {}min, dst={})",
                    utc, local, rule_label, offset_minutes, is_dst
                );
                if let Some(step) = correction_secs {
                    info!("Clock corrected by {}s", step);
                }
            }
            DiagnosticEvent::SyncFailed {
                error,
                consecutive_failures,
            } => warn!(
                "Sync failed: {} ({} in a row), running on estimate",
                error, consecutive_failures
            ),
        }
    }
}

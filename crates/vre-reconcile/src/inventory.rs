use tracing::{debug, warn};
use vre_config::VreConfig;
use vre_schemas::{LogStreams, Status};

use crate::{safe_div, InventoryReconRecord, ReconWindow};

/// One record per inventory count taken inside the window, in date order.
pub fn reconcile_inventory(cfg: &VreConfig, window: &ReconWindow, streams: &LogStreams) -> Vec<InventoryReconRecord> {
    let band = cfg.reconcile.inventory_pct;

    let out: Vec<InventoryReconRecord> = streams
        .inventory_counts
        .iter()
        .filter(|c| window.contains(c.date))
        .map(|c| {
            let variance = c.counted_qty - c.expected_qty;
            let variance_pct = safe_div(variance, c.expected_qty);
            let status = band.classify(variance_pct.abs());
            let has_reason = c.reason_code.as_deref().map(|r| !r.trim().is_empty()).unwrap_or(false);
            let reason_missing = status != Status::Green && !has_reason;
            if reason_missing {
                warn!(date = %c.date, item_id = %c.item_id, variance_pct, "count outside tolerance without a reason code");
            }

            InventoryReconRecord {
                date: c.date,
                item_id: c.item_id.clone(),
                trigger: c.trigger,
                expected_qty: c.expected_qty,
                counted_qty: c.counted_qty,
                variance,
                variance_pct,
                status,
                reason_code: c.reason_code.clone(),
                reason_missing,
            }
        })
        .collect();

    debug!(counts = out.len(), "inventory counts reconciled");
    out
}

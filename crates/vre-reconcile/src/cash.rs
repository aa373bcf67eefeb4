use tracing::{debug, warn};
use vre_config::VreConfig;
use vre_schemas::{index_by_date, LogStreams, PaymentMethod, PaymentStatus, Status};

use crate::{safe_div, CashReconRecord, ReconWindow};

/// Daily sales-to-payments reconciliation.
///
/// Revenue is every line recognised that day; only `Paid` lines count as
/// received. Receivables (unpaid and part-paid lines) open at the ledger's
/// balance before the window and accumulate day by day.
pub fn reconcile_cash(cfg: &VreConfig, window: &ReconWindow, streams: &LogStreams) -> Vec<CashReconRecord> {
    let crate_size = cfg.farm.crate_size;
    let band = cfg.reconcile.cash;
    let sales = index_by_date(&streams.sales, |s| s.date());
    let opening_receivables: f64 = streams
        .sales
        .iter()
        .filter(|s| s.date() < window.start && s.is_receivable())
        .map(|s| s.line_total(crate_size))
        .sum();

    let out: Vec<CashReconRecord> = window
        .days()
        .into_iter()
        .scan(opening_receivables, |receivables, date| {
            let today = sales.get(&date).map(Vec::as_slice).unwrap_or_default();

            let mut revenue = 0.0;
            let mut momo = 0.0;
            let mut bank = 0.0;
            let mut cash = 0.0;
            let mut pending_deposit = 0.0;
            let mut paid_count = 0u32;
            let mut paid_with_evidence = 0u32;

            for s in today {
                let total = s.line_total(crate_size);
                revenue += total;
                match s.payment_status {
                    PaymentStatus::Paid => {
                        paid_count += 1;
                        if s.has_evidence() {
                            paid_with_evidence += 1;
                        }
                        match s.payment_method {
                            PaymentMethod::MoMo => momo += total,
                            PaymentMethod::BankTransfer => bank += total,
                            PaymentMethod::Cash => {
                                cash += total;
                                let deposited_same_day = s.cash_deposited_at.map(|t| t.date() <= date).unwrap_or(false);
                                if !deposited_same_day {
                                    pending_deposit += total;
                                }
                            }
                        }
                    }
                    PaymentStatus::PartPaid | PaymentStatus::Unpaid => *receivables += total,
                }
            }

            let total_received = momo + bank + cash;
            let variance = revenue - total_received;
            let status = band.classify(variance.abs());
            if status == Status::Red {
                warn!(%date, variance, "cash variance at red");
            }

            Some(CashReconRecord {
                date,
                revenue,
                received_momo: momo,
                received_bank: bank,
                received_cash: cash,
                total_received,
                variance,
                paid_count,
                paid_with_evidence,
                evidence_completeness: safe_div(f64::from(paid_with_evidence), f64::from(paid_count)),
                outstanding_receivables: *receivables,
                cash_pending_deposit: pending_deposit,
                status,
            })
        })
        .collect();

    debug!(days = out.len(), "cash chain reconciled");
    out
}

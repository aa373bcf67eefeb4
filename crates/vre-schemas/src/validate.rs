use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::{Cohort, DailyLogRecord, LogDomain};

/// Reasons a log record is rejected at the input boundary.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("{domain:?} record #{index}: field `{field}` is negative or not finite ({value})")]
    NegativeOrNonFinite {
        domain: LogDomain,
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("{domain:?} record #{index}: field `{field}` is blank")]
    BlankId {
        domain: LogDomain,
        index: usize,
        field: &'static str,
    },
    #[error("production record #{index}: graded eggs {graded} exceed collected eggs {collected}")]
    GradeOverflow {
        index: usize,
        graded: u64,
        collected: u64,
    },
    #[error("feed record #{index}: returned {returned} kg exceeds issued {issued} kg")]
    FeedReturnExceedsIssue {
        index: usize,
        issued: f64,
        returned: f64,
    },
    #[error("{domain:?} record #{index}: dated {date} before cohort {cohort_id} arrived ({arrival})")]
    BeforeArrival {
        domain: LogDomain,
        index: usize,
        cohort_id: String,
        date: NaiveDate,
        arrival: NaiveDate,
    },
    #[error("{domain:?} record #{index}: dated {date} after as-of date {as_of}")]
    FutureDated {
        domain: LogDomain,
        index: usize,
        date: NaiveDate,
        as_of: NaiveDate,
    },
}

/// Cohort occupying `housing_id` on `date`: the latest arrival on or before it.
/// Before the first occupant arrived, that first occupant is returned so the
/// record is reported against it.
fn occupant<'a>(by_house: &BTreeMap<&str, Vec<&'a Cohort>>, housing_id: &str, date: NaiveDate) -> Option<&'a Cohort> {
    let occupants = by_house.get(housing_id)?;
    occupants
        .iter()
        .rev()
        .find(|c| c.arrival_date <= date)
        .or_else(|| occupants.first())
        .copied()
}

fn check_num(
    errs: &mut Vec<ValidationError>,
    domain: LogDomain,
    index: usize,
    field: &'static str,
    value: f64,
) {
    if !value.is_finite() || value < 0.0 {
        errs.push(ValidationError::NegativeOrNonFinite {
            domain,
            index,
            field,
            value,
        });
    }
}

fn check_id(errs: &mut Vec<ValidationError>, domain: LogDomain, index: usize, field: &'static str, v: &str) {
    if v.trim().is_empty() {
        errs.push(ValidationError::BlankId { domain, index, field });
    }
}

/// Validate raw records before they enter a pass.
///
/// Returns every violation found (not just the first), in record order.
/// Records that reference a cohort must not predate its arrival. A housing
/// unit may be reused by successive flocks, so a house-keyed record belongs to
/// whichever cohort had arrived there most recently on the record's date.
/// Records must not be dated after `as_of`.
pub fn validate_records(
    records: &[DailyLogRecord],
    cohorts: &[Cohort],
    as_of: NaiveDate,
    crate_size: u32,
) -> Result<(), Vec<ValidationError>> {
    let by_id: BTreeMap<&str, &Cohort> = cohorts.iter().map(|c| (c.cohort_id.as_str(), c)).collect();
    let mut by_house: BTreeMap<&str, Vec<&Cohort>> = BTreeMap::new();
    for c in cohorts {
        for h in &c.housing_units {
            by_house.entry(h.as_str()).or_default().push(c);
        }
    }
    for occupants in by_house.values_mut() {
        occupants.sort_by(|a, b| (a.arrival_date, &a.cohort_id).cmp(&(b.arrival_date, &b.cohort_id)));
    }

    let mut errs = Vec::new();

    for (index, rec) in records.iter().enumerate() {
        let domain = rec.domain();
        let date = rec.date();
        if date > as_of {
            errs.push(ValidationError::FutureDated {
                domain,
                index,
                date,
                as_of,
            });
        }

        let owner: Option<&Cohort> = match rec {
            DailyLogRecord::Production(r) => {
                check_id(&mut errs, domain, index, "housing_id", &r.housing_id);
                let collected = r.total_eggs(crate_size);
                let graded = r.graded_eggs();
                if graded > collected {
                    errs.push(ValidationError::GradeOverflow {
                        index,
                        graded,
                        collected,
                    });
                }
                occupant(&by_house, &r.housing_id, date)
            }
            DailyLogRecord::Sale(r) => {
                check_id(&mut errs, domain, index, "invoice_id", &r.invoice_id);
                check_id(&mut errs, domain, index, "customer_id", &r.customer_id);
                check_num(&mut errs, domain, index, "unit_price", r.unit_price);
                None
            }
            DailyLogRecord::Procurement(r) => {
                check_id(&mut errs, domain, index, "receipt_id", &r.receipt_id);
                check_id(&mut errs, domain, index, "vendor_id", &r.vendor_id);
                check_num(&mut errs, domain, index, "quantity", r.quantity);
                check_num(&mut errs, domain, index, "unit_cost", r.unit_cost);
                if let Some(b) = r.price_benchmark {
                    check_num(&mut errs, domain, index, "price_benchmark", b);
                }
                None
            }
            DailyLogRecord::Feed(r) => {
                check_id(&mut errs, domain, index, "cohort_id", &r.cohort_id);
                check_num(&mut errs, domain, index, "qty_issued_kg", r.qty_issued_kg);
                check_num(&mut errs, domain, index, "qty_returned_kg", r.qty_returned_kg);
                if r.qty_returned_kg > r.qty_issued_kg {
                    errs.push(ValidationError::FeedReturnExceedsIssue {
                        index,
                        issued: r.qty_issued_kg,
                        returned: r.qty_returned_kg,
                    });
                }
                by_id.get(r.cohort_id.as_str()).copied()
            }
            DailyLogRecord::Mortality(r) => {
                check_id(&mut errs, domain, index, "housing_id", &r.housing_id);
                occupant(&by_house, &r.housing_id, date)
            }
            DailyLogRecord::InventoryCount(r) => {
                check_id(&mut errs, domain, index, "item_id", &r.item_id);
                check_num(&mut errs, domain, index, "expected_qty", r.expected_qty);
                check_num(&mut errs, domain, index, "counted_qty", r.counted_qty);
                None
            }
            DailyLogRecord::EggStock(_) => None,
            DailyLogRecord::Medication(r) => {
                check_id(&mut errs, domain, index, "cohort_id", &r.cohort_id);
                check_id(&mut errs, domain, index, "product", &r.product);
                by_id.get(r.cohort_id.as_str()).copied()
            }
        };

        if let Some(c) = owner {
            if date < c.arrival_date {
                errs.push(ValidationError::BeforeArrival {
                    domain,
                    index,
                    cohort_id: c.cohort_id.clone(),
                    date,
                    arrival: c.arrival_date,
                });
            }
        }
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

//! Schedule totals and calendar-year aggregation.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::PaymentRecord;
use crate::types::Money;

/// Totals over one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_extra: Money,
    pub total_lump_sum: Money,
    /// Principal, interest, extra and lump sums together.
    pub total_paid: Money,
    pub final_balance: Money,
}

impl ScheduleSummary {
    pub fn from_schedule(schedule: &[PaymentRecord]) -> Self {
        let mut summary = ScheduleSummary {
            periods: schedule.len() as u32,
            total_principal: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_extra: Decimal::ZERO,
            total_lump_sum: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            final_balance: schedule
                .last()
                .map_or(Decimal::ZERO, |r| r.remaining_balance),
        };
        for r in schedule {
            summary.total_principal += r.principal_paid;
            summary.total_interest += r.interest_paid;
            summary.total_extra += r.extra_paid;
            summary.total_lump_sum += r.lump_sum_paid;
        }
        summary.total_paid = summary.total_principal
            + summary.total_interest
            + summary.total_extra
            + summary.total_lump_sum;
        summary
    }
}

/// Payments falling in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub year: i32,
    pub payments: u32,
    pub principal: Money,
    pub interest: Money,
    pub extra: Money,
    pub lump_sum: Money,
    /// Balance after the last payment of the year.
    pub closing_balance: Money,
}

/// Group a schedule by the calendar year of each payment date.
///
/// Years appear in schedule order; a year without payments is skipped.
pub fn yearly_breakdown(schedule: &[PaymentRecord]) -> Vec<YearlyTotals> {
    let mut years: Vec<YearlyTotals> = Vec::new();

    for r in schedule {
        let year = r.date.year();
        let needs_new = years.last().map_or(true, |y| y.year != year);
        if needs_new {
            years.push(YearlyTotals {
                year,
                payments: 0,
                principal: Decimal::ZERO,
                interest: Decimal::ZERO,
                extra: Decimal::ZERO,
                lump_sum: Decimal::ZERO,
                closing_balance: r.remaining_balance,
            });
        }
        if let Some(current) = years.last_mut() {
            current.payments += 1;
            current.principal += r.principal_paid;
            current.interest += r.interest_paid;
            current.extra += r.extra_paid;
            current.lump_sum += r.lump_sum_paid;
            current.closing_balance = r.remaining_balance;
        }
    }

    years
}

//! Period-by-period amortization schedule generator.
//!
//! Walks a single loan forward one payment period at a time, applying the
//! level payment, a recurring extra payment, and any dated lump sums, until
//! the balance falls to the cent floor or the period cap is reached.
//!
//! All arithmetic runs in full `Decimal` precision. Values are rounded to
//! cents (half away from zero) only when a [`PaymentRecord`] is emitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cadence::PaymentFrequency;
use crate::types::{round_cents, Money, Rate};
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balance at or below which the loan is considered fully paid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Hard cap on emitted periods; stops non-convergent configurations.
pub const MAX_PERIODS: u32 = 1200;

/// Overpayment below this is level-payment arithmetic noise, absorbed by the
/// zero floor rather than reconciled.
const OVERAGE_TOLERANCE: Decimal = dec!(0.0000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A one-time principal payment on a given date.
///
/// `amount` and `date` are optional so that incomplete entries can cross a
/// loosely-typed boundary; such entries are ignored by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumPayment {
    pub id: String,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl LumpSumPayment {
    pub fn new(id: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            amount: Some(amount),
            date: Some(date),
        }
    }

    /// Present amount and date, and a positive amount.
    pub fn is_well_formed(&self) -> bool {
        self.dated_amount().is_some()
    }

    fn dated_amount(&self) -> Option<(NaiveDate, Money)> {
        match (self.date, self.amount) {
            (Some(date), Some(amount)) if amount > Decimal::ZERO => Some((date, amount)),
            _ => None,
        }
    }
}

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based period number.
    pub payment_number: u32,
    pub date: NaiveDate,
    /// Scheduled principal, net of any final-period clamp.
    ///
    /// Derived from the rounded balances (previous balance minus this
    /// balance, extra and lump sum), so it may differ by a cent from the
    /// full-precision principal rounded on its own. The balance chain is exact.
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// Recurring extra payment applied this period.
    pub extra_paid: Money,
    /// Lump sums applied this period.
    pub lump_sum_paid: Money,
    pub remaining_balance: Money,
}

impl PaymentRecord {
    /// Principal reduction recorded in this row (scheduled + extra + lump sum).
    pub fn total_principal_reduction(&self) -> Money {
        self.principal_paid + self.extra_paid + self.lump_sum_paid
    }

    /// Everything paid this period, interest included.
    pub fn total_payment(&self) -> Money {
        self.total_principal_reduction() + self.interest_paid
    }
}

/// Inputs for a single generator run.
#[derive(Debug, Clone)]
pub struct ScheduleParams<'a> {
    pub principal: Money,
    /// Interest rate for one payment period (0.005 = 0.5%).
    pub periodic_rate: Rate,
    /// Level payment covering interest and scheduled principal.
    pub periodic_payment: Money,
    /// Date of the first payment.
    pub start_date: NaiveDate,
    pub frequency: PaymentFrequency,
    /// Recurring extra principal, already converted to this cadence.
    pub extra_per_period: Money,
    pub lump_sums: &'a [LumpSumPayment],
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the amortization schedule for `params`.
///
/// The caller guarantees positive principal, rate and payment. Lump sums
/// missing an amount or date are dropped before they are sorted by date;
/// each remaining lump sum is applied once, on the first period dated on or
/// after it.
///
/// Emitted balances are the rounded running balance. The emitted principal
/// is the rounded balance change net of the rounded extra and lump-sum
/// amounts, so each row reconciles to the cent against the previous one.
pub fn generate_schedule(params: &ScheduleParams<'_>) -> Vec<PaymentRecord> {
    let lump_sums = sorted_lump_sums(params.lump_sums);
    let mut next_lump = 0usize;

    let mut balance = params.principal;
    let mut emitted_balance = round_cents(params.principal);
    let mut current_date = params.start_date;
    let mut payment_number: u32 = 1;
    let mut schedule = Vec::new();

    while balance > BALANCE_EPSILON && payment_number <= MAX_PERIODS {
        let interest = balance * params.periodic_rate;
        let mut principal_portion = params.periodic_payment - interest;
        let mut extra = params.extra_per_period;
        let mut lump_sum = Decimal::ZERO;

        while next_lump < lump_sums.len() && lump_sums[next_lump].0 <= current_date {
            lump_sum += lump_sums[next_lump].1;
            next_lump += 1;
        }

        // Trim the overpayment: lump sum first, then extra. Failing both, the
        // scheduled principal drops to balance minus interest and the
        // residual runs off in the following periods.
        let total = principal_portion + extra + lump_sum;
        if total > balance + OVERAGE_TOLERANCE {
            let overage = total - balance;
            if lump_sum >= overage {
                lump_sum -= overage;
            } else if extra >= overage - lump_sum {
                extra -= overage - lump_sum;
                lump_sum = Decimal::ZERO;
            } else {
                principal_portion = (balance - interest).max(Decimal::ZERO);
                extra = Decimal::ZERO;
                lump_sum = Decimal::ZERO;
            }
        }

        balance -= principal_portion + extra + lump_sum;
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        let extra_paid = round_cents(extra);
        let lump_sum_paid = round_cents(lump_sum);
        let remaining_balance = round_cents(balance);
        let principal_paid =
            (emitted_balance - remaining_balance - extra_paid - lump_sum_paid).max(Decimal::ZERO);

        schedule.push(PaymentRecord {
            payment_number,
            date: current_date,
            principal_paid,
            interest_paid: round_cents(interest),
            extra_paid,
            lump_sum_paid,
            remaining_balance,
        });
        emitted_balance = remaining_balance;

        if balance <= BALANCE_EPSILON {
            break;
        }

        current_date = match params.frequency.next_date(current_date) {
            Some(d) => d,
            None => {
                debug!(%current_date, "payment date left the calendar range; stopping schedule");
                break;
            }
        };
        payment_number += 1;
    }

    schedule
}

/// True when the schedule ends at or below the cent floor.
///
/// An empty schedule means there was nothing left to amortize.
pub fn is_paid_off(schedule: &[PaymentRecord]) -> bool {
    schedule
        .last()
        .map_or(true, |r| r.remaining_balance <= BALANCE_EPSILON)
}

/// Sum of interest across a schedule.
pub fn total_interest(schedule: &[PaymentRecord]) -> Money {
    schedule.iter().map(|r| r.interest_paid).sum()
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> PayoffResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sorted_lump_sums(lump_sums: &[LumpSumPayment]) -> Vec<(NaiveDate, Money)> {
    let mut dated: Vec<(NaiveDate, Money)> =
        lump_sums.iter().filter_map(|l| l.dated_amount()).collect();
    dated.sort_by_key(|(date, _)| *date);
    dated
}

//! Loan payoff projection: baseline vs. optimized schedules.
//!
//! Converts user-facing loan terms into per-period generator inputs, runs the
//! schedule generator for the contractual (baseline) and accelerated
//! (optimized) cases, and attributes savings to each lump sum by re-running
//! the optimized case with that lump sum removed.
//!
//! Attribution costs one full re-simulation per lump sum. With at most 1200
//! periods per run this stays cheap for realistic numbers of lump sums, but
//! grows linearly with them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

use super::cadence::{Cadence, ExtraPaymentFrequency, PaymentFrequency};
use super::schedule::{
    generate_schedule, is_paid_off, total_interest, LumpSumPayment, PaymentRecord,
    ScheduleParams, MAX_PERIODS,
};
use super::summary::ScheduleSummary;
use crate::error::PayoffError;
use crate::time_value::level_payment;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::PayoffResult;

/// Months per year; the headline payment is always quoted monthly.
const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan terms and prepayment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    /// Amount borrowed.
    pub principal: Money,
    /// Nominal annual rate as a percentage (6.5 = 6.5%).
    pub annual_interest_rate_percent: Decimal,
    pub term_years: u32,
    /// Date of the first regular payment.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Recurring extra payment, stated at `extra_payment_frequency`.
    #[serde(default)]
    pub extra_payment_amount: Money,
    #[serde(default)]
    pub extra_payment_frequency: ExtraPaymentFrequency,
    #[serde(default)]
    pub lump_sum_payments: Vec<LumpSumPayment>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Savings attributable to a single lump sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumpSumImpact {
    pub id: String,
    pub amount: Money,
    pub date: NaiveDate,
    /// Interest of the optimized plan without this lump sum, minus the
    /// interest of the full optimized plan. Never negative.
    pub interest_saved: Money,
    pub periods_saved: u32,
}

/// Per-period generator inputs derived from a [`LoanConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub payments_per_year: u32,
    pub periodic_rate: Rate,
    pub total_periods: u32,
    /// Full-precision monthly-basis payment.
    pub monthly_payment: Money,
    /// Full-precision payment at `payment_frequency`.
    pub periodic_payment: Money,
    /// Extra payment restated per regular period.
    pub extra_per_period: Money,
}

/// Complete projection handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProjection {
    /// Standard monthly payment for the loan terms, whatever the cadence.
    pub monthly_payment: Money,
    /// Payment applied each period in the schedules.
    pub periodic_payment: Money,
    pub baseline_schedule: Vec<PaymentRecord>,
    pub optimized_schedule: Vec<PaymentRecord>,
    pub total_interest_saved: Money,
    pub periods_saved: u32,
    pub payoff_date: NaiveDate,
    pub baseline_total_interest: Money,
    pub optimized_total_interest: Money,
    pub lump_sum_impacts: Vec<LumpSumImpact>,
    pub baseline_summary: ScheduleSummary,
    pub optimized_summary: ScheduleSummary,
    /// False when the optimized schedule stopped at the period cap.
    pub paid_off: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a loan. Returns `None` when the terms are not usable.
///
/// Pure and deterministic: the same config always yields the same projection.
pub fn project_loan(config: &LoanConfig) -> Option<LoanProjection> {
    compute_projection(config).ok().map(|(projection, _)| projection)
}

/// Project a loan inside the standard output envelope, with warnings.
pub fn analyze_loan(config: &LoanConfig) -> PayoffResult<ComputationOutput<LoanProjection>> {
    let start = Instant::now();
    let (projection, warnings) = compute_projection(config)?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with recurring extra and lump-sum prepayments",
        config,
        warnings,
        elapsed,
        projection,
    ))
}

/// Derive per-period rate, payments and extra amount from the loan terms.
pub fn derive_parameters(config: &LoanConfig) -> PayoffResult<LoanParameters> {
    validate_config(config)?;

    let payments_per_year = config.payment_frequency.periods_per_year();
    let annual_rate = config.annual_interest_rate_percent / dec!(100);
    let periodic_rate = annual_rate / Decimal::from(payments_per_year);
    let total_periods = periods_for(config.term_years, payments_per_year)?;

    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let monthly_periods = periods_for(config.term_years, MONTHS_PER_YEAR)?;
    let monthly_payment = level_payment(monthly_rate, monthly_periods, config.principal)?;
    let periodic_payment = level_payment(periodic_rate, total_periods, config.principal)?;

    // Same annual extra total, restated at the regular cadence.
    let extra_per_period = config.extra_payment_amount
        * Decimal::from(config.extra_payment_frequency.periods_per_year())
        / Decimal::from(payments_per_year);

    Ok(LoanParameters {
        payments_per_year,
        periodic_rate,
        total_periods,
        monthly_payment,
        periodic_payment,
        extra_per_period,
    })
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn compute_projection(config: &LoanConfig) -> PayoffResult<(LoanProjection, Vec<String>)> {
    let params = derive_parameters(config)?;
    let mut warnings: Vec<String> = Vec::new();

    debug!(
        principal = %config.principal,
        periodic_rate = %params.periodic_rate,
        periodic_payment = %params.periodic_payment,
        extra_per_period = %params.extra_per_period,
        lump_sums = config.lump_sum_payments.len(),
        "projecting loan"
    );

    let baseline_schedule = generate_schedule(&schedule_params(config, &params, Decimal::ZERO, &[]));
    let optimized_schedule = generate_schedule(&schedule_params(
        config,
        &params,
        params.extra_per_period,
        &config.lump_sum_payments,
    ));

    let baseline_total_interest = total_interest(&baseline_schedule);
    let optimized_total_interest = total_interest(&optimized_schedule);
    let total_interest_saved = baseline_total_interest - optimized_total_interest;
    let periods_saved = len_u32(&baseline_schedule).saturating_sub(len_u32(&optimized_schedule));
    let payoff_date = optimized_schedule
        .last()
        .map_or(config.start_date, |r| r.date);
    let paid_off = is_paid_off(&optimized_schedule);

    let lump_sum_impacts: Vec<LumpSumImpact> = config
        .lump_sum_payments
        .iter()
        .filter_map(|lump| {
            lump_sum_impact(
                config,
                &params,
                lump,
                &optimized_schedule,
                optimized_total_interest,
            )
        })
        .collect();

    collect_warnings(
        config,
        &params,
        &baseline_schedule,
        &optimized_schedule,
        payoff_date,
        &mut warnings,
    );

    let projection = LoanProjection {
        monthly_payment: round_cents(params.monthly_payment),
        periodic_payment: round_cents(params.periodic_payment),
        baseline_summary: ScheduleSummary::from_schedule(&baseline_schedule),
        optimized_summary: ScheduleSummary::from_schedule(&optimized_schedule),
        baseline_schedule,
        optimized_schedule,
        total_interest_saved,
        periods_saved,
        payoff_date,
        baseline_total_interest,
        optimized_total_interest,
        lump_sum_impacts,
        paid_off,
    };

    Ok((projection, warnings))
}

/// Re-run the optimized plan without `lump` and measure the difference.
///
/// Malformed lump sums were never applied, so they get no impact entry.
fn lump_sum_impact(
    config: &LoanConfig,
    params: &LoanParameters,
    lump: &LumpSumPayment,
    optimized_schedule: &[PaymentRecord],
    optimized_total_interest: Money,
) -> Option<LumpSumImpact> {
    let (amount, date) = match (lump.amount, lump.date) {
        (Some(amount), Some(date)) if lump.is_well_formed() => (amount, date),
        _ => return None,
    };

    let others: Vec<LumpSumPayment> = config
        .lump_sum_payments
        .iter()
        .filter(|other| other.id != lump.id)
        .cloned()
        .collect();
    let without = generate_schedule(&schedule_params(
        config,
        params,
        params.extra_per_period,
        &others,
    ));

    let interest_saved =
        (total_interest(&without) - optimized_total_interest).max(Decimal::ZERO);
    let periods_saved = len_u32(&without).saturating_sub(len_u32(optimized_schedule));

    debug!(id = %lump.id, %interest_saved, periods_saved, "lump sum counterfactual");

    Some(LumpSumImpact {
        id: lump.id.clone(),
        amount,
        date,
        interest_saved,
        periods_saved,
    })
}

fn collect_warnings(
    config: &LoanConfig,
    params: &LoanParameters,
    baseline: &[PaymentRecord],
    optimized: &[PaymentRecord],
    payoff_date: NaiveDate,
    warnings: &mut Vec<String>,
) {
    if params.periodic_payment <= config.principal * params.periodic_rate {
        warnings.push(format!(
            "Periodic payment {} does not exceed first-period interest; the balance will not amortize",
            round_cents(params.periodic_payment)
        ));
    }

    for (label, schedule) in [("Baseline", baseline), ("Optimized", optimized)] {
        if !is_paid_off(schedule) {
            let final_balance = schedule
                .last()
                .map_or(config.principal, |r| r.remaining_balance);
            warn!(schedule = label, %final_balance, "schedule hit the period cap");
            warnings.push(format!(
                "{label} schedule did not pay off within {MAX_PERIODS} periods; remaining balance {final_balance}"
            ));
        }
    }

    let malformed = config
        .lump_sum_payments
        .iter()
        .filter(|l| !l.is_well_formed())
        .count();
    if malformed > 0 {
        warnings.push(format!(
            "{malformed} lump sum payment(s) without a positive amount and a date were ignored"
        ));
    }

    if is_paid_off(optimized) {
        for lump in config.lump_sum_payments.iter().filter(|l| l.is_well_formed()) {
            if let Some(date) = lump.date.filter(|d| *d > payoff_date) {
                warnings.push(format!(
                    "Lump sum '{}' dated {date} falls after the projected payoff on {payoff_date} and was not applied",
                    lump.id
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_config(config: &LoanConfig) -> PayoffResult<()> {
    if config.principal <= Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if config.annual_interest_rate_percent <= Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "annual_interest_rate_percent".into(),
            reason: "Annual interest rate must be positive".into(),
        });
    }
    if config.term_years == 0 {
        return Err(PayoffError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be at least one year".into(),
        });
    }
    if config.extra_payment_amount < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "extra_payment_amount".into(),
            reason: "Extra payment cannot be negative".into(),
        });
    }
    let mut seen = HashSet::new();
    for lump in &config.lump_sum_payments {
        if !seen.insert(lump.id.as_str()) {
            return Err(PayoffError::InvalidInput {
                field: "lump_sum_payments".into(),
                reason: format!("Duplicate lump sum id '{}'", lump.id),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn schedule_params<'a>(
    config: &LoanConfig,
    params: &LoanParameters,
    extra_per_period: Money,
    lump_sums: &'a [LumpSumPayment],
) -> ScheduleParams<'a> {
    ScheduleParams {
        principal: config.principal,
        periodic_rate: params.periodic_rate,
        periodic_payment: params.periodic_payment,
        start_date: config.start_date,
        frequency: config.payment_frequency,
        extra_per_period,
        lump_sums,
    }
}

fn periods_for(term_years: u32, per_year: u32) -> PayoffResult<u32> {
    term_years
        .checked_mul(per_year)
        .ok_or_else(|| PayoffError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Term of {term_years} years overflows the period count"),
        })
}

fn len_u32(schedule: &[PaymentRecord]) -> u32 {
    schedule.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_config() -> LoanConfig {
        LoanConfig {
            principal: dec!(250000),
            annual_interest_rate_percent: dec!(6.5),
            term_years: 30,
            start_date: date(2024, 1, 1),
            payment_frequency: PaymentFrequency::Monthly,
            extra_payment_amount: Decimal::ZERO,
            extra_payment_frequency: ExtraPaymentFrequency::Monthly,
            lump_sum_payments: vec![],
        }
    }

    #[test]
    fn test_standard_monthly_payment() {
        let p = project_loan(&standard_config()).unwrap();
        assert_eq!(p.monthly_payment, dec!(1580.17));
        assert_eq!(p.periodic_payment, dec!(1580.17));
        assert_eq!(p.optimized_schedule.len(), 360);
        assert_eq!(p.payoff_date, date(2053, 12, 1));
        assert!(p.paid_off);
    }

    #[test]
    fn test_no_prepayments_matches_baseline() {
        let p = project_loan(&standard_config()).unwrap();
        assert_eq!(p.baseline_schedule, p.optimized_schedule);
        assert_eq!(p.total_interest_saved, Decimal::ZERO);
        assert_eq!(p.periods_saved, 0);
        assert!(p.lump_sum_impacts.is_empty());
        // 360 * 1580.17 - 250000 ≈ 318861
        assert_close(p.baseline_total_interest, dec!(318861.2), dec!(5), "total interest");
    }

    #[test]
    fn test_monthly_extra_shortens_loan() {
        let mut config = standard_config();
        config.extra_payment_amount = dec!(200);
        let p = project_loan(&config).unwrap();
        assert!(p.periods_saved > 0);
        assert!(p.optimized_schedule.len() < 360);
        assert!(p.total_interest_saved > Decimal::ZERO);
        assert_eq!(p.optimized_schedule[0].extra_paid, dec!(200));
        assert_eq!(
            p.total_interest_saved,
            p.baseline_total_interest - p.optimized_total_interest
        );
    }

    #[test]
    fn test_single_lump_sum_impact() {
        let mut config = standard_config();
        config.lump_sum_payments = vec![LumpSumPayment::new("bonus", dec!(10000), date(2024, 12, 1))];
        let p = project_loan(&config).unwrap();
        assert_eq!(p.lump_sum_impacts.len(), 1);
        let impact = &p.lump_sum_impacts[0];
        assert_eq!(impact.id, "bonus");
        assert_eq!(impact.amount, dec!(10000));
        assert!(impact.interest_saved > Decimal::ZERO);
        // Sole prepayment: its impact is the whole saving.
        assert_eq!(impact.interest_saved, p.total_interest_saved);
        assert_eq!(impact.periods_saved, p.periods_saved);
        assert_eq!(p.optimized_schedule[11].lump_sum_paid, dec!(10000));
    }

    #[test]
    fn test_zero_principal_returns_none() {
        let mut config = standard_config();
        config.principal = Decimal::ZERO;
        assert!(project_loan(&config).is_none());
        assert!(matches!(
            analyze_loan(&config),
            Err(PayoffError::InvalidInput { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_invalid_rate_and_term() {
        let mut config = standard_config();
        config.annual_interest_rate_percent = Decimal::ZERO;
        assert!(project_loan(&config).is_none());

        let mut config = standard_config();
        config.term_years = 0;
        assert!(project_loan(&config).is_none());

        let mut config = standard_config();
        config.extra_payment_amount = dec!(-1);
        assert!(project_loan(&config).is_none());
    }

    #[test]
    fn test_duplicate_lump_sum_ids_rejected() {
        let mut config = standard_config();
        config.lump_sum_payments = vec![
            LumpSumPayment::new("a", dec!(100), date(2025, 1, 1)),
            LumpSumPayment::new("a", dec!(200), date(2026, 1, 1)),
        ];
        assert!(project_loan(&config).is_none());
    }

    #[test]
    fn test_derive_parameters_biweekly_with_weekly_extra() {
        let mut config = standard_config();
        config.payment_frequency = PaymentFrequency::Biweekly;
        config.extra_payment_amount = dec!(50);
        config.extra_payment_frequency = ExtraPaymentFrequency::Weekly;
        let params = derive_parameters(&config).unwrap();
        assert_eq!(params.payments_per_year, 26);
        assert_eq!(params.total_periods, 780);
        assert_eq!(params.periodic_rate, dec!(0.065) / dec!(26));
        assert_eq!(params.extra_per_period, dec!(100));
        assert_close(params.monthly_payment, dec!(1580.17), TOL, "monthly basis");
        assert!(params.periodic_payment < params.monthly_payment / dec!(2));
    }

    #[test]
    fn test_extra_converted_across_cadences() {
        let mut config = standard_config();
        config.extra_payment_amount = dec!(1200);
        config.extra_payment_frequency = ExtraPaymentFrequency::Yearly;
        let params = derive_parameters(&config).unwrap();
        assert_eq!(params.extra_per_period, dec!(100));
    }

    #[test]
    fn test_biweekly_projection_pays_off() {
        let mut config = standard_config();
        config.payment_frequency = PaymentFrequency::Biweekly;
        let p = project_loan(&config).unwrap();
        assert_eq!(p.optimized_schedule.len(), 780);
        assert_eq!(p.optimized_schedule[1].date, date(2024, 1, 15));
        assert!(p.paid_off);
        assert_close(p.monthly_payment, dec!(1580.17), TOL, "headline payment");
    }

    #[test]
    fn test_daily_cadence_hits_cap_with_warning() {
        let mut config = standard_config();
        config.payment_frequency = PaymentFrequency::Daily;
        let out = analyze_loan(&config).unwrap();
        let p = &out.result;
        assert_eq!(p.optimized_schedule.len(), MAX_PERIODS as usize);
        assert!(!p.paid_off);
        assert!(p.optimized_schedule.last().unwrap().remaining_balance > dec!(0.01));
        assert!(out.warnings.iter().any(|w| w.contains("did not pay off")));
    }

    #[test]
    fn test_lump_sum_after_payoff_warns() {
        let mut config = standard_config();
        config.term_years = 1;
        config.lump_sum_payments = vec![LumpSumPayment::new("late", dec!(500), date(2030, 1, 1))];
        let out = analyze_loan(&config).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("'late'")));
        let impact = &out.result.lump_sum_impacts[0];
        assert_eq!(impact.interest_saved, Decimal::ZERO);
        assert_eq!(impact.periods_saved, 0);
    }

    #[test]
    fn test_malformed_lump_sums_skipped_in_impacts() {
        let mut config = standard_config();
        config.lump_sum_payments = vec![
            LumpSumPayment {
                id: "blank".into(),
                amount: None,
                date: Some(date(2025, 1, 1)),
            },
            LumpSumPayment::new("ok", dec!(5000), date(2025, 1, 1)),
        ];
        let out = analyze_loan(&config).unwrap();
        assert_eq!(out.result.lump_sum_impacts.len(), 1);
        assert_eq!(out.result.lump_sum_impacts[0].id, "ok");
        assert!(out.warnings.iter().any(|w| w.contains("were ignored")));
    }

    #[test]
    fn test_empty_optimized_schedule_uses_start_date() {
        let mut config = standard_config();
        config.principal = dec!(0.005);
        let p = project_loan(&config).unwrap();
        assert!(p.optimized_schedule.is_empty());
        assert_eq!(p.payoff_date, config.start_date);
        assert!(p.paid_off);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let mut config = standard_config();
        config.extra_payment_amount = dec!(75.5);
        config.extra_payment_frequency = ExtraPaymentFrequency::Fortnightly;
        config.lump_sum_payments = vec![
            LumpSumPayment::new("a", dec!(3000), date(2026, 6, 1)),
            LumpSumPayment::new("b", dec!(7000), date(2025, 2, 14)),
        ];
        assert_eq!(project_loan(&config), project_loan(&config));
    }

    #[test]
    fn test_config_from_json_defaults() {
        let json = r#"{
            "principal": 250000,
            "annual_interest_rate_percent": "6.5",
            "term_years": 30,
            "start_date": "2024-01-01"
        }"#;
        let config: LoanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, standard_config());
    }
}

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use loan_payoff_core::amortization::cadence::{ExtraPaymentFrequency, PaymentFrequency};
use loan_payoff_core::amortization::projection::{self, LoanConfig, LoanProjection};
use loan_payoff_core::amortization::schedule::{parse_date, LumpSumPayment};
use loan_payoff_core::amortization::summary::yearly_breakdown;

use crate::input;

/// Loan terms, from flags or a JSON config
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON loan config (overrides individual flags). Without it and
    /// without --principal, a config is read from piped stdin.
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long, alias = "annual-rate")]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Regular payment cadence: monthly, biweekly, weekly, daily, yearly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Recurring extra payment amount
    #[arg(long, default_value = "0")]
    pub extra: Decimal,

    /// Extra payment cadence: monthly, fortnightly, weekly, daily, yearly
    #[arg(long, default_value = "monthly")]
    pub extra_frequency: ExtraPaymentFrequency,

    /// One-time payment as ID:AMOUNT:YYYY-MM-DD (repeatable)
    #[arg(long = "lump-sum", value_parser = parse_lump_sum)]
    pub lump_sums: Vec<LumpSumPayment>,
}

/// Which of the two projected schedules to print
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScheduleKind {
    Baseline,
    Optimized,
}

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[arg(long, value_enum, default_value = "optimized")]
    pub which: ScheduleKind,
}

pub fn run_project(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = loan_config(args)?;
    let result = projection::analyze_loan(&config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection = project(args.loan)?;
    let rows = match args.which {
        ScheduleKind::Baseline => projection.baseline_schedule,
        ScheduleKind::Optimized => projection.optimized_schedule,
    };
    Ok(serde_json::to_value(rows)?)
}

pub fn run_yearly(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection = project(args.loan)?;
    let schedule = match args.which {
        ScheduleKind::Baseline => &projection.baseline_schedule,
        ScheduleKind::Optimized => &projection.optimized_schedule,
    };
    Ok(serde_json::to_value(yearly_breakdown(schedule))?)
}

pub fn run_impacts(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection = project(args)?;
    Ok(serde_json::to_value(projection.lump_sum_impacts)?)
}

fn project(args: LoanArgs) -> Result<LoanProjection, Box<dyn std::error::Error>> {
    let config = loan_config(args)?;
    // analyze_loan names the offending field; project_loan would only say "no result"
    Ok(projection::analyze_loan(&config)?.result)
}

fn loan_config(args: LoanArgs) -> Result<LoanConfig, Box<dyn std::error::Error>> {
    if reads_config(&args) {
        if let Some(config) = input::read_loan_config(args.input.as_deref())? {
            debug!(source = args.input.as_deref().unwrap_or("stdin"), "loan config loaded");
            return Ok(config);
        }
    }
    Ok(LoanConfig {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_interest_rate_percent: args
            .rate
            .ok_or("--rate is required (or provide --input)")?,
        term_years: args
            .term_years
            .ok_or("--term-years is required (or provide --input)")?,
        start_date: args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?,
        payment_frequency: args.frequency,
        extra_payment_amount: args.extra,
        extra_payment_frequency: args.extra_frequency,
        lump_sum_payments: args.lump_sums,
    })
}

/// An explicit --input always wins; stdin is only consulted when the loan
/// terms were not given as flags.
fn reads_config(args: &LoanArgs) -> bool {
    args.input.is_some() || args.principal.is_none()
}

/// Parse `ID:AMOUNT:YYYY-MM-DD`.
pub fn parse_lump_sum(s: &str) -> Result<LumpSumPayment, String> {
    let mut parts = s.splitn(3, ':');
    let (id, amount, date) = match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(amount), Some(date)) if !id.trim().is_empty() => (id, amount, date),
        _ => return Err(format!("Expected ID:AMOUNT:YYYY-MM-DD, got '{s}'")),
    };
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("Invalid lump sum amount '{amount}': {e}"))?;
    let date = parse_date(date).map_err(|e| format!("Invalid lump sum date '{date}': {e}"))?;
    Ok(LumpSumPayment::new(id.trim(), amount, date))
}

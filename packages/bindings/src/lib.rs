use napi::Result as NapiResult;
use napi_derive::napi;

use loan_payoff_core::amortization::summary::yearly_breakdown;
use loan_payoff_core::{analyze_loan, LoanConfig, LoanProjection};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_config(input_json: &str) -> NapiResult<LoanConfig> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn projection(input_json: &str) -> NapiResult<LoanProjection> {
    let config = parse_config(input_json)?;
    Ok(analyze_loan(&config).map_err(to_napi_error)?.result)
}

// ---------------------------------------------------------------------------
// Loan payoff
// ---------------------------------------------------------------------------

/// Full projection wrapped in the standard output envelope.
#[napi]
pub fn project_loan(input_json: String) -> NapiResult<String> {
    let config = parse_config(&input_json)?;
    let output = analyze_loan(&config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// One schedule as a JSON array. `which` is "baseline" or "optimized";
/// "yearly-baseline" and "yearly-optimized" return calendar-year totals.
#[napi]
pub fn loan_schedule(input_json: String, which: String) -> NapiResult<String> {
    let p = projection(&input_json)?;
    match which.as_str() {
        "baseline" => serde_json::to_string(&p.baseline_schedule),
        "optimized" => serde_json::to_string(&p.optimized_schedule),
        "yearly-baseline" => serde_json::to_string(&yearly_breakdown(&p.baseline_schedule)),
        "yearly-optimized" => serde_json::to_string(&yearly_breakdown(&p.optimized_schedule)),
        other => {
            return Err(to_napi_error(format!(
                "Unknown schedule '{other}' (expected baseline, optimized, yearly-baseline or yearly-optimized)"
            )))
        }
    }
    .map_err(to_napi_error)
}

#[napi]
pub fn lump_sum_impacts(input_json: String) -> NapiResult<String> {
    let p = projection(&input_json)?;
    serde_json::to_string(&p.lump_sum_impacts).map_err(to_napi_error)
}

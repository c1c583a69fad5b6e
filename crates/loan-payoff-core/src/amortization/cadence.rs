//! Payment cadences and calendar stepping.
//!
//! Regular payments and recurring extra payments are stated at independent
//! frequencies sharing one per-year table, the [`Cadence`] trait. Only
//! regular payments are dated: the extra amount is restated per regular
//! period before the schedule runs.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar distance between two consecutive events of a cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceStep {
    Days(u64),
    Months(u32),
}

impl CadenceStep {
    /// Advance `date` by one step. Month steps clamp to the last valid day
    /// of the target month (Jan 31 -> Feb 28). Returns `None` when the
    /// result leaves chrono's representable range.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            CadenceStep::Days(n) => date.checked_add_days(Days::new(n)),
            CadenceStep::Months(n) => date.checked_add_months(Months::new(n)),
        }
    }
}

/// Shared behaviour of payment and extra-payment frequencies.
pub trait Cadence {
    /// Number of events in one year.
    fn periods_per_year(&self) -> u32;
}

/// Cadence of regular loan payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    #[serde(alias = "fortnightly")]
    Biweekly,
    Weekly,
    Daily,
    Yearly,
}

/// Cadence of the recurring extra payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPaymentFrequency {
    #[default]
    Monthly,
    #[serde(alias = "biweekly")]
    Fortnightly,
    Weekly,
    Daily,
    Yearly,
}

impl Cadence for PaymentFrequency {
    fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Daily => 365,
            PaymentFrequency::Yearly => 1,
        }
    }
}

impl PaymentFrequency {
    /// Calendar step between payments.
    pub fn step(&self) -> CadenceStep {
        match self {
            PaymentFrequency::Monthly => CadenceStep::Months(1),
            PaymentFrequency::Biweekly => CadenceStep::Days(14),
            PaymentFrequency::Weekly => CadenceStep::Days(7),
            PaymentFrequency::Daily => CadenceStep::Days(1),
            PaymentFrequency::Yearly => CadenceStep::Months(12),
        }
    }

    pub fn next_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.step().advance(date)
    }
}

impl Cadence for ExtraPaymentFrequency {
    fn periods_per_year(&self) -> u32 {
        match self {
            ExtraPaymentFrequency::Monthly => 12,
            ExtraPaymentFrequency::Fortnightly => 26,
            ExtraPaymentFrequency::Weekly => 52,
            ExtraPaymentFrequency::Daily => 365,
            ExtraPaymentFrequency::Yearly => 1,
        }
    }
}

impl std::str::FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(PaymentFrequency::Monthly),
            "biweekly" | "fortnightly" => Ok(PaymentFrequency::Biweekly),
            "weekly" => Ok(PaymentFrequency::Weekly),
            "daily" => Ok(PaymentFrequency::Daily),
            "yearly" => Ok(PaymentFrequency::Yearly),
            other => Err(format!(
                "Unknown payment frequency '{other}'. Use: monthly, biweekly, weekly, daily, yearly"
            )),
        }
    }
}

impl std::str::FromStr for ExtraPaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(ExtraPaymentFrequency::Monthly),
            "fortnightly" | "biweekly" => Ok(ExtraPaymentFrequency::Fortnightly),
            "weekly" => Ok(ExtraPaymentFrequency::Weekly),
            "daily" => Ok(ExtraPaymentFrequency::Daily),
            "yearly" => Ok(ExtraPaymentFrequency::Yearly),
            other => Err(format!(
                "Unknown extra payment frequency '{other}'. Use: monthly, fortnightly, weekly, daily, yearly"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_periods_per_year_table() {
        assert_eq!(PaymentFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(PaymentFrequency::Biweekly.periods_per_year(), 26);
        assert_eq!(PaymentFrequency::Weekly.periods_per_year(), 52);
        assert_eq!(PaymentFrequency::Daily.periods_per_year(), 365);
        assert_eq!(PaymentFrequency::Yearly.periods_per_year(), 1);
        assert_eq!(ExtraPaymentFrequency::Fortnightly.periods_per_year(), 26);
    }

    #[test]
    fn test_biweekly_steps_fourteen_days() {
        let start = date(2024, 1, 1);
        assert_eq!(PaymentFrequency::Biweekly.step(), CadenceStep::Days(14));
        assert_eq!(PaymentFrequency::Biweekly.next_date(start), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_monthly_step_clamps_to_month_end() {
        let next = PaymentFrequency::Monthly.next_date(date(2024, 1, 31));
        assert_eq!(next, Some(date(2024, 2, 29)));
        let next = PaymentFrequency::Monthly.next_date(date(2023, 1, 31));
        assert_eq!(next, Some(date(2023, 2, 28)));
    }

    #[test]
    fn test_yearly_step_from_leap_day() {
        let next = PaymentFrequency::Yearly.next_date(date(2024, 2, 29));
        assert_eq!(next, Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_weekly_and_daily_steps() {
        assert_eq!(PaymentFrequency::Weekly.next_date(date(2024, 12, 28)), Some(date(2025, 1, 4)));
        assert_eq!(PaymentFrequency::Daily.next_date(date(2024, 2, 28)), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_step_past_calendar_range() {
        assert_eq!(PaymentFrequency::Daily.next_date(NaiveDate::MAX), None);
    }

    #[test]
    fn test_frequency_serde_lowercase() {
        let f: PaymentFrequency = serde_json::from_str("\"biweekly\"").unwrap();
        assert_eq!(f, PaymentFrequency::Biweekly);
        assert_eq!(
            serde_json::to_string(&ExtraPaymentFrequency::Fortnightly).unwrap(),
            "\"fortnightly\""
        );
        let alias: PaymentFrequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(alias, PaymentFrequency::Biweekly);
        assert!(serde_json::from_str::<PaymentFrequency>("\"quarterly\"").is_err());
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Weekly".parse::<PaymentFrequency>(), Ok(PaymentFrequency::Weekly));
        assert!("quarterly".parse::<ExtraPaymentFrequency>().is_err());
    }
}

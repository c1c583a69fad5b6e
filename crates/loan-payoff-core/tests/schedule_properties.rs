use chrono::NaiveDate;
use loan_payoff_core::amortization::cadence::{ExtraPaymentFrequency, PaymentFrequency};
use loan_payoff_core::amortization::schedule::{LumpSumPayment, BALANCE_EPSILON, MAX_PERIODS};
use loan_payoff_core::{project_loan, LoanConfig};
use proptest::prelude::{prop_assert, prop_assert_eq, prop_oneof, proptest, Just, Strategy};
use rust_decimal::Decimal;

fn payment_frequency() -> impl Strategy<Value = PaymentFrequency> {
    prop_oneof![
        Just(PaymentFrequency::Monthly),
        Just(PaymentFrequency::Biweekly),
        Just(PaymentFrequency::Weekly),
        Just(PaymentFrequency::Yearly),
    ]
}

fn extra_frequency() -> impl Strategy<Value = ExtraPaymentFrequency> {
    prop_oneof![
        Just(ExtraPaymentFrequency::Monthly),
        Just(ExtraPaymentFrequency::Fortnightly),
        Just(ExtraPaymentFrequency::Weekly),
        Just(ExtraPaymentFrequency::Yearly),
    ]
}

#[allow(clippy::too_many_arguments)]
fn config(
    principal_cents: u64,
    rate_bp: u32,
    term_years: u32,
    frequency: PaymentFrequency,
    extra_cents: u64,
    extra_frequency: ExtraPaymentFrequency,
    lump_cents: u64,
    lump_offset_days: u64,
) -> LoanConfig {
    let start_date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let lump_date = start_date + chrono::Days::new(lump_offset_days);
    LoanConfig {
        principal: Decimal::new(principal_cents as i64, 2),
        annual_interest_rate_percent: Decimal::new(rate_bp as i64, 2),
        term_years,
        start_date,
        payment_frequency: frequency,
        extra_payment_amount: Decimal::new(extra_cents as i64, 2),
        extra_payment_frequency: extra_frequency,
        lump_sum_payments: vec![LumpSumPayment::new(
            "lump",
            Decimal::new(lump_cents as i64 + 1, 2),
            lump_date,
        )],
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(32))]

    #[test]
    fn prop_schedules_reconcile_and_never_increase(
        principal_cents in 100_000u64..100_000_000,
        rate_bp in 1u32..1500,
        term_years in 1u32..31,
        frequency in payment_frequency(),
        extra_cents in 0u64..50_000,
        extra_freq in extra_frequency(),
        lump_cents in 0u64..5_000_000,
        lump_offset_days in 0u64..3650
    ) {
        let cfg = config(
            principal_cents, rate_bp, term_years, frequency,
            extra_cents, extra_freq, lump_cents, lump_offset_days,
        );
        let p = project_loan(&cfg).unwrap();

        for schedule in [&p.baseline_schedule, &p.optimized_schedule] {
            prop_assert!(schedule.len() <= MAX_PERIODS as usize);
            let mut prior = cfg.principal;
            for (i, r) in schedule.iter().enumerate() {
                prop_assert_eq!(r.payment_number as usize, i + 1);
                prop_assert!(r.remaining_balance >= Decimal::ZERO);
                prop_assert!(r.remaining_balance <= prior);
                let expected = prior - r.principal_paid - r.extra_paid - r.lump_sum_paid;
                prop_assert!((r.remaining_balance - expected).abs() <= BALANCE_EPSILON);
                prior = r.remaining_balance;
            }
            if schedule.len() < MAX_PERIODS as usize {
                prop_assert!(schedule.last().map_or(true, |r| r.remaining_balance <= BALANCE_EPSILON));
            }
        }

        prop_assert!(p.optimized_schedule.len() <= p.baseline_schedule.len());
        prop_assert!(p.total_interest_saved >= Decimal::ZERO);
        for impact in &p.lump_sum_impacts {
            prop_assert!(impact.interest_saved >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_no_prepayments_means_identical_schedules(
        principal_cents in 100_000u64..100_000_000,
        rate_bp in 1u32..1500,
        term_years in 1u32..31,
        frequency in payment_frequency()
    ) {
        let mut cfg = config(
            principal_cents, rate_bp, term_years, frequency,
            0, ExtraPaymentFrequency::Monthly, 0, 0,
        );
        cfg.lump_sum_payments.clear();
        let p = project_loan(&cfg).unwrap();
        prop_assert_eq!(&p.baseline_schedule, &p.optimized_schedule);
        prop_assert_eq!(p.total_interest_saved, Decimal::ZERO);
        prop_assert_eq!(p.periods_saved, 0);
    }

    #[test]
    fn prop_projection_is_idempotent(
        principal_cents in 100_000u64..10_000_000,
        rate_bp in 1u32..1500,
        term_years in 1u32..31,
        frequency in payment_frequency(),
        extra_cents in 0u64..50_000,
        lump_cents in 0u64..1_000_000,
        lump_offset_days in 0u64..3650
    ) {
        let cfg = config(
            principal_cents, rate_bp, term_years, frequency,
            extra_cents, ExtraPaymentFrequency::Weekly, lump_cents, lump_offset_days,
        );
        prop_assert_eq!(project_loan(&cfg), project_loan(&cfg));
    }
}

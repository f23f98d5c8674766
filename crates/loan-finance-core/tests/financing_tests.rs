use loan_finance_core::financing::{
    analyze_loan, compare_fee_financing, compute_amortization, compute_effective_rate,
    summarize_loan, AmortizationRow, LoanTerms,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(principal: Decimal, term_months: u32, rate: Decimal) -> LoanTerms {
    LoanTerms {
        principal,
        term_months,
        nominal_annual_rate_percent: rate,
        origination_fee: Decimal::ZERO,
        periodic_fee: Decimal::ZERO,
        finance_fees_into_principal: false,
    }
}

// ===========================================================================
// Known scenarios
// ===========================================================================

#[test]
fn test_zero_interest_no_fees() {
    let terms = loan(dec!(12000), 12, Decimal::ZERO);
    let amort = compute_amortization(&terms);
    assert_eq!(amort.periodic_payment, dec!(1000));
    assert_eq!(
        amort.schedule[0],
        AmortizationRow {
            period_index: 1,
            payment: dec!(1000),
            interest_portion: Decimal::ZERO,
            fee_portion: Decimal::ZERO,
            principal_portion: dec!(1000),
            remaining_balance: dec!(11000),
        }
    );
    assert_eq!(amort.schedule[11].remaining_balance, Decimal::ZERO);

    let summary = summarize_loan(&terms);
    assert_eq!(summary.total_cost, dec!(12000));
    assert_eq!(summary.effective_annual_rate_percent, Decimal::ZERO);
}

#[test]
fn test_zero_interest_periodic_fee_only() {
    let mut terms = loan(dec!(10000), 10, Decimal::ZERO);
    terms.periodic_fee = dec!(100);

    let summary = summarize_loan(&terms);
    assert_eq!(summary.periodic_payment, dec!(1100));
    assert_eq!(summary.total_cost, dec!(11000));
    assert_eq!(summary.total_fees, dec!(1000));
    assert!(
        summary.effective_annual_rate_percent > Decimal::ZERO,
        "Periodic fee should lift the effective rate, got {}",
        summary.effective_annual_rate_percent
    );
    assert!(summary.rate_estimate.converged);
}

#[test]
fn test_fee_financing_changes_effective_rate() {
    let mut terms = loan(dec!(30000), 24, dec!(5));
    terms.origination_fee = dec!(1900);

    let financed = summarize_loan(&terms.with_fee_financing(true));
    let upfront = summarize_loan(&terms.with_fee_financing(false));

    assert!(financed.rate_estimate.converged);
    assert!(upfront.rate_estimate.converged);
    assert!(financed.effective_annual_rate_percent > dec!(5));
    assert!(
        upfront.effective_annual_rate_percent > financed.effective_annual_rate_percent,
        "upfront {} should exceed financed {}",
        upfront.effective_annual_rate_percent,
        financed.effective_annual_rate_percent
    );
    assert!(financed.periodic_payment > upfront.periodic_payment);
}

#[test]
fn test_negative_principal_is_zeroed() {
    let terms = loan(dec!(-500), 12, dec!(5));
    let amort = compute_amortization(&terms);
    assert_eq!(amort.periodic_payment, Decimal::ZERO);
    assert!(amort.schedule.is_empty());

    let summary = summarize_loan(&terms);
    assert_eq!(summary.total_cost, Decimal::ZERO);
    assert_eq!(summary.effective_annual_rate_percent, Decimal::ZERO);
}

#[test]
fn test_zero_principal_and_zero_term_are_zeroed() {
    assert!(compute_amortization(&loan(Decimal::ZERO, 12, dec!(5)))
        .schedule
        .is_empty());
    assert!(compute_amortization(&loan(dec!(1000), 0, dec!(5)))
        .schedule
        .is_empty());
}

#[test]
fn test_balance_positive_until_last_row() {
    let terms = loan(dec!(25000), 48, dec!(7.9));
    let amort = compute_amortization(&terms);
    let (last, rest) = amort.schedule.split_last().unwrap();
    assert!(rest.iter().all(|r| r.remaining_balance > Decimal::ZERO));
    assert_eq!(last.remaining_balance, Decimal::ZERO);
}

#[test]
fn test_effective_rate_from_rounded_payment() {
    // 100k over 5 years at 12% nominal: payment 2224.44 rounds to 2224
    let terms = loan(dec!(100000), 60, dec!(12));
    let amort = compute_amortization(&terms);
    assert_eq!(amort.periodic_payment, dec!(2224));

    let estimate = compute_effective_rate(&terms, amort.periodic_payment);
    assert!(estimate.converged);
    assert!(estimate.iterations < 10);
    assert!(estimate.annual_rate_percent >= dec!(12));
}

#[test]
fn test_analyze_loan_envelope() {
    let mut terms = loan(dec!(30000), 24, dec!(5));
    terms.origination_fee = dec!(1900);
    let output = analyze_loan(&terms.into()).unwrap();
    assert!(output.warnings.is_empty());
    assert_eq!(output.result.schedule.len(), 24);
    assert_eq!(output.assumptions["term_months"], 24);
}

#[test]
fn test_compare_fee_financing_reports_spread() {
    let mut terms = loan(dec!(30000), 24, dec!(5));
    terms.origination_fee = dec!(1900);
    let output = compare_fee_financing(&terms);
    let cmp = &output.result;
    assert!(cmp.effective_rate_spread_percent > Decimal::ZERO);
    assert_eq!(
        cmp.periodic_payment_difference,
        cmp.financed.periodic_payment - cmp.upfront.periodic_payment
    );
    // Financing the fee means paying interest on it.
    assert_eq!(cmp.cheaper_option, "upfront");
}

// ===========================================================================
// Properties
// ===========================================================================

fn ordinary_terms_strategy() -> impl Strategy<Value = LoanTerms> {
    (
        1_000u32..500_000,
        1u32..=360,
        0u32..=3_000,
        0u32..=5_000,
        0u32..=100,
        any::<bool>(),
    )
        .prop_map(|(principal, term, rate_bp, orig_fee, fee, finance)| LoanTerms {
            principal: Decimal::from(principal),
            term_months: term,
            nominal_annual_rate_percent: Decimal::new(rate_bp as i64, 2),
            origination_fee: Decimal::from(orig_fee),
            periodic_fee: Decimal::from(fee),
            finance_fees_into_principal: finance,
        })
}

/// Terms long and steep enough that (1+r)^n leaves Decimal range and the
/// payment falls back to interest-only.
fn interest_only_terms_strategy() -> impl Strategy<Value = LoanTerms> {
    (
        100u32..5_000,
        2_400u32..=3_600,
        3_600u32..=60_000,
        0u32..=500,
        any::<bool>(),
    )
        .prop_map(|(principal, term, rate_bp, orig_fee, finance)| LoanTerms {
            principal: Decimal::from(principal),
            term_months: term,
            nominal_annual_rate_percent: Decimal::new(rate_bp as i64, 2),
            origination_fee: Decimal::from(orig_fee),
            periodic_fee: Decimal::ZERO,
            finance_fees_into_principal: finance,
        })
}

fn terms_strategy() -> impl Strategy<Value = LoanTerms> {
    prop_oneof![
        3 => ordinary_terms_strategy(),
        1 => interest_only_terms_strategy(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_principal_portions_sum_to_financed(terms in terms_strategy()) {
        let amort = compute_amortization(&terms);
        let repaid: Decimal = amort.schedule.iter().map(|r| r.principal_portion).sum();
        prop_assert_eq!(repaid, terms.financed_principal());
        prop_assert_eq!(amort.schedule.len(), terms.term_months as usize);
    }

    #[test]
    fn prop_balance_non_increasing_and_ends_at_zero(terms in terms_strategy()) {
        let amort = compute_amortization(&terms);
        let mut previous = terms.financed_principal();
        for row in &amort.schedule {
            prop_assert!(row.remaining_balance <= previous);
            prop_assert!(row.interest_portion >= Decimal::ZERO);
            prop_assert!(row.principal_portion >= Decimal::ZERO);
            prop_assert!(row.fee_portion >= Decimal::ZERO);
            previous = row.remaining_balance;
        }
        prop_assert_eq!(previous, Decimal::ZERO);
    }

    #[test]
    fn prop_balance_reaches_zero_only_at_last_row(terms in terms_strategy()) {
        let amort = compute_amortization(&terms);
        prop_assert!(amort.periodic_payment > Decimal::ZERO);
        let (last, rest) = amort.schedule.split_last().unwrap();
        for row in rest {
            prop_assert!(row.remaining_balance > Decimal::ZERO);
        }
        prop_assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn prop_effective_rate_not_below_nominal(terms in terms_strategy()) {
        let summary = summarize_loan(&terms);
        prop_assert!(summary.effective_annual_rate_percent >= terms.nominal_annual_rate_percent);
    }

    #[test]
    fn prop_summary_is_deterministic(terms in terms_strategy()) {
        prop_assert_eq!(summarize_loan(&terms), summarize_loan(&terms));
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::LoanFinanceResult;

use super::amortization::{compute_amortization, AmortizationRow};
use super::effective_rate::{compute_effective_rate_with, RateEstimate, SolverConfig};
use super::terms::LoanTerms;

/// Everything a contract needs to quote a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub financed_principal: Money,
    pub periodic_payment: Money,
    pub effective_annual_rate_percent: Percent,
    pub total_interest: Money,
    /// Periodic fees over the term plus the origination fee
    pub total_fees: Money,
    /// Everything the borrower pays: all scheduled payments, plus the
    /// origination fee when it is collected up front
    pub total_cost: Money,
    pub rate_estimate: RateEstimate,
    pub schedule: Vec<AmortizationRow>,
}

/// Loan terms with optional solver overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}

impl From<LoanTerms> for LoanAnalysisInput {
    fn from(terms: LoanTerms) -> Self {
        LoanAnalysisInput {
            terms,
            solver: None,
        }
    }
}

/// Side-by-side summaries of the same loan with the origination fee
/// financed versus paid up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeFinancingComparison {
    pub financed: LoanSummary,
    pub upfront: LoanSummary,
    /// Upfront effective rate minus financed effective rate
    pub effective_rate_spread_percent: Percent,
    /// Financed total cost minus upfront total cost
    pub total_cost_difference: Money,
    /// Financed periodic payment minus upfront periodic payment
    pub periodic_payment_difference: Money,
    /// "financed", "upfront" or "equal", by total cost
    pub cheaper_option: String,
}

/// Amortize the loan and solve its effective rate with default settings.
pub fn summarize_loan(terms: &LoanTerms) -> LoanSummary {
    summarize_loan_with(terms, &SolverConfig::default())
}

/// Amortize the loan and solve its effective rate.
///
/// Non-computable terms produce the zeroed summary: zero payment, empty
/// schedule, zero totals.
pub fn summarize_loan_with(terms: &LoanTerms, config: &SolverConfig) -> LoanSummary {
    let amortization = compute_amortization(terms);
    let rate_estimate =
        compute_effective_rate_with(terms, amortization.periodic_payment, config);

    if amortization.schedule.is_empty() {
        return LoanSummary {
            financed_principal: Decimal::ZERO,
            periodic_payment: Decimal::ZERO,
            effective_annual_rate_percent: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            rate_estimate,
            schedule: amortization.schedule,
        };
    }

    let total_interest: Money = amortization
        .schedule
        .iter()
        .map(|r| r.interest_portion)
        .sum();
    let periodic_fees: Money = amortization.schedule.iter().map(|r| r.fee_portion).sum();
    let scheduled_payments: Money = amortization.schedule.iter().map(|r| r.payment).sum();

    LoanSummary {
        financed_principal: terms.financed_principal(),
        periodic_payment: amortization.periodic_payment,
        effective_annual_rate_percent: rate_estimate.annual_rate_percent,
        total_interest,
        total_fees: periodic_fees + terms.origination_fee,
        total_cost: scheduled_payments + terms.upfront_fee(),
        rate_estimate,
        schedule: amortization.schedule,
    }
}

/// Full loan analysis wrapped in the standard output envelope.
///
/// Fails only when the supplied solver settings are invalid; unusable loan
/// terms still return the zeroed summary, with a warning explaining why.
pub fn analyze_loan(
    input: &LoanAnalysisInput,
) -> LoanFinanceResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();

    let config = input.solver.clone().unwrap_or_default();
    config.validate()?;

    let terms = &input.terms;
    let summary = summarize_loan_with(terms, &config);
    let warnings = summary_warnings(terms, &summary, &config);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity amortization with Newton-Raphson effective rate (IRR)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "term_months": terms.term_months,
            "nominal_annual_rate_percent": terms.nominal_annual_rate_percent.to_string(),
            "origination_fee": terms.origination_fee.to_string(),
            "periodic_fee": terms.periodic_fee.to_string(),
            "finance_fees_into_principal": terms.finance_fees_into_principal,
            "rounding": "whole currency units, half away from zero",
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        summary,
    ))
}

/// Summarize the loan twice, once per fee-financing policy.
pub fn compare_fee_financing(terms: &LoanTerms) -> ComputationOutput<FeeFinancingComparison> {
    compare_fee_financing_with(terms, &SolverConfig::default())
}

pub fn compare_fee_financing_with(
    terms: &LoanTerms,
    config: &SolverConfig,
) -> ComputationOutput<FeeFinancingComparison> {
    let start = Instant::now();

    let financed_terms = terms.with_fee_financing(true);
    let upfront_terms = terms.with_fee_financing(false);
    let financed = summarize_loan_with(&financed_terms, config);
    let upfront = summarize_loan_with(&upfront_terms, config);

    let mut warnings = summary_warnings(&financed_terms, &financed, config);
    for w in summary_warnings(&upfront_terms, &upfront, config) {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }
    if terms.origination_fee.is_zero() {
        warnings.push("No origination fee: both policies yield the same loan".into());
    }

    let total_cost_difference = financed.total_cost - upfront.total_cost;
    let cheaper_option = if total_cost_difference > Decimal::ZERO {
        "upfront"
    } else if total_cost_difference < Decimal::ZERO {
        "financed"
    } else {
        "equal"
    };

    let comparison = FeeFinancingComparison {
        effective_rate_spread_percent: upfront.effective_annual_rate_percent
            - financed.effective_annual_rate_percent,
        total_cost_difference,
        periodic_payment_difference: financed.periodic_payment - upfront.periodic_payment,
        cheaper_option: cheaper_option.to_string(),
        financed,
        upfront,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Fee-financing comparison (financed vs upfront origination fee)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "term_months": terms.term_months,
            "nominal_annual_rate_percent": terms.nominal_annual_rate_percent.to_string(),
            "origination_fee": terms.origination_fee.to_string(),
            "periodic_fee": terms.periodic_fee.to_string(),
        }),
        warnings,
        elapsed,
        comparison,
    )
}

fn summary_warnings(
    terms: &LoanTerms,
    summary: &LoanSummary,
    config: &SolverConfig,
) -> Vec<String> {
    let mut warnings = terms.validation_warnings();
    warnings.extend(
        summary
            .rate_estimate
            .warnings(terms.nominal_annual_rate_percent, config),
    );
    warnings
}

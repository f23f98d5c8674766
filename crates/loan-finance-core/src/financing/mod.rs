//! Loan financing: amortization schedule, effective rate, and the summary
//! that combines them.

pub mod amortization;
pub mod effective_rate;
pub mod summary;
pub mod terms;

pub use amortization::{compute_amortization, AmortizationResult, AmortizationRow};
pub use effective_rate::{
    compute_effective_rate, compute_effective_rate_with, RateEstimate, SolverConfig,
};
pub use summary::{
    analyze_loan, compare_fee_financing, compare_fee_financing_with, summarize_loan,
    summarize_loan_with, FeeFinancingComparison, LoanAnalysisInput, LoanSummary,
};
pub use terms::{LoanTerms, MAX_TERM_MONTHS};

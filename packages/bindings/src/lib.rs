use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use loan_finance_core::financing::{self, LoanAnalysisInput, LoanTerms};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(terms_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    let output = financing::compute_amortization(&terms);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Effective rate
// ---------------------------------------------------------------------------

/// `periodic_payment` is a decimal string, e.g. "1316".
#[napi]
pub fn compute_effective_rate(terms_json: String, periodic_payment: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    let payment: Decimal = periodic_payment.trim().parse().map_err(to_napi_error)?;
    let output = financing::compute_effective_rate(&terms, payment);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[napi]
pub fn summarize_loan(input_json: String) -> NapiResult<String> {
    let input: LoanAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = financing::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_fee_financing(terms_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    let output = financing::compare_fee_financing(&terms);
    serde_json::to_string(&output).map_err(to_napi_error)
}

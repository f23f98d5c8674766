use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

use loan_finance_core::financing::{
    self, AmortizationResult, LoanAnalysisInput, LoanTerms, RateEstimate, SolverConfig,
};
use loan_finance_core::types::with_metadata;

use crate::input;

/// Loan terms, from a file, piped stdin, or individual flags
#[derive(Args)]
pub struct LoanTermsArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount disbursed to the borrower
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Number of monthly periods
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Nominal annual rate in percent (5 = 5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// One-time origination fee
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub origination_fee: Decimal,

    /// Fee charged with every monthly payment
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub periodic_fee: Decimal,

    /// Finance the origination fee into the principal instead of paying it up front
    #[arg(long)]
    pub finance_fees: bool,
}

impl LoanTermsArgs {
    /// Deserialise the payload from `--input` or stdin, if either is given.
    fn read_payload<T: DeserializeOwned>(&self) -> Result<Option<T>, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return Ok(Some(input::file::read_input(path)?));
        }
        input::stdin::read_stdin()
    }

    fn terms_from_flags(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let term_months = self
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;

        Ok(LoanTerms {
            principal,
            term_months,
            nominal_annual_rate_percent: rate,
            origination_fee: self.origination_fee,
            periodic_fee: self.periodic_fee,
            finance_fees_into_principal: self.finance_fees,
        })
    }

    fn resolve(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        match self.read_payload()? {
            Some(terms) => Ok(terms),
            None => self.terms_from_flags(),
        }
    }
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let terms = args.terms.resolve()?;

    let result: AmortizationResult = financing::compute_amortization(&terms);

    let output = with_metadata(
        "Annuity amortization schedule",
        &terms,
        terms.validation_warnings(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

/// Arguments for the effective annual rate
#[derive(Args)]
pub struct EffectiveRateArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    /// Periodic payment to solve against (defaults to the amortized payment)
    #[arg(long)]
    pub periodic_payment: Option<Decimal>,
}

pub fn run_effective_rate(
    args: EffectiveRateArgs,
    solver: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let terms = args.terms.resolve()?;

    let periodic_payment = args
        .periodic_payment
        .unwrap_or_else(|| financing::compute_amortization(&terms).periodic_payment);
    let estimate: RateEstimate =
        financing::compute_effective_rate_with(&terms, periodic_payment, solver);

    let mut warnings = terms.validation_warnings();
    warnings.extend(estimate.warnings(terms.nominal_annual_rate_percent, solver));

    let output = with_metadata(
        "Newton-Raphson effective annual rate (IRR)",
        &serde_json::json!({
            "terms": terms,
            "periodic_payment": periodic_payment.to_string(),
            "solver": solver,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        estimate,
    );
    Ok(serde_json::to_value(output)?)
}

/// Arguments for the full loan summary
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,
}

pub fn run_summary(
    args: SummaryArgs,
    solver: Option<SolverConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut analysis_input: LoanAnalysisInput = match args.terms.read_payload()? {
        Some(input) => input,
        None => args.terms.terms_from_flags()?.into(),
    };
    if solver.is_some() {
        analysis_input.solver = solver;
    }

    let result = financing::analyze_loan(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the fee-financing comparison
#[derive(Args)]
pub struct CompareFeesArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,
}

pub fn run_compare_fees(
    args: CompareFeesArgs,
    solver: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.terms.resolve()?;
    let result = financing::compare_fee_financing_with(&terms, solver);
    Ok(serde_json::to_value(result)?)
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanFinanceError;
use crate::time_value::{annualize, npv, npv_with_derivative};
use crate::types::{Money, Percent, Rate};
use crate::LoanFinanceResult;

use super::terms::LoanTerms;

const MONTHS_PER_YEAR: u32 = 12;

/// Newton-Raphson settings for the effective-rate search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop once |NPV| falls below this
    pub tolerance: Decimal,
    /// Stop when the NPV slope is flatter than this
    pub derivative_tolerance: Decimal,
    pub max_iterations: u32,
    /// Lower clamp on the monthly rate after each step
    pub min_periodic_rate: Rate,
    /// Upper clamp on the monthly rate after each step
    pub max_periodic_rate: Rate,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: dec!(0.000001),
            derivative_tolerance: dec!(0.000001),
            max_iterations: 100,
            min_periodic_rate: dec!(0.001),
            max_periodic_rate: dec!(0.5),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> LoanFinanceResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "tolerance".into(),
                reason: "Tolerance must be positive".into(),
            });
        }
        if self.derivative_tolerance < Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "derivative_tolerance".into(),
                reason: "Derivative tolerance cannot be negative".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(LoanFinanceError::InvalidInput {
                field: "max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        if self.min_periodic_rate <= dec!(-1) {
            return Err(LoanFinanceError::InvalidInput {
                field: "min_periodic_rate".into(),
                reason: "Rate floor must be greater than -100%".into(),
            });
        }
        if self.min_periodic_rate > self.max_periodic_rate {
            return Err(LoanFinanceError::InvalidInput {
                field: "max_periodic_rate".into(),
                reason: "Rate ceiling must not be below the floor".into(),
            });
        }
        Ok(())
    }
}

/// Result of the effective-rate search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Annualized IRR, floored at the nominal rate (5 = 5%)
    pub annual_rate_percent: Percent,
    /// Monthly IRR the search ended on
    pub periodic_rate: Rate,
    pub iterations: u32,
    /// False when the search stopped on the iteration cap or a flat
    /// derivative; the rate is then the last clamped estimate.
    pub converged: bool,
    /// NPV of the borrower's cash flows at `periodic_rate`
    pub residual_npv: Money,
    /// True when the nominal-rate floor replaced the solved rate
    pub floored_at_nominal: bool,
}

impl RateEstimate {
    fn zeroed() -> Self {
        RateEstimate {
            annual_rate_percent: Decimal::ZERO,
            periodic_rate: Decimal::ZERO,
            iterations: 0,
            converged: false,
            residual_npv: Decimal::ZERO,
            floored_at_nominal: false,
        }
    }

    /// Envelope warnings for an unconverged or floored search. The zeroed
    /// estimate never ran, so it carries none.
    pub fn warnings(
        &self,
        nominal_annual_rate_percent: Percent,
        config: &SolverConfig,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.iterations > 0 && !self.converged {
            warnings.push(format!(
                "Effective rate did not converge within {} iterations; reporting the last estimate \
                 (monthly rate {}, residual NPV {})",
                config.max_iterations,
                self.periodic_rate.round_dp(6),
                self.residual_npv.round_dp(2)
            ));
        }
        if self.floored_at_nominal {
            warnings.push(format!(
                "Solved effective rate was below the nominal {nominal_annual_rate_percent}%; \
                 nominal rate reported"
            ));
        }
        warnings
    }
}

/// Cash flows seen by the borrower, index 0 being disbursement.
///
/// The borrower always receives the bare principal. An origination fee
/// paid up front comes straight back out of it at index 0.
pub fn borrower_cash_flows(terms: &LoanTerms, periodic_payment: Money) -> Vec<Money> {
    let mut flows = Vec::with_capacity(terms.term_months as usize + 1);

    let mut disbursement = -terms.principal;
    if !terms.finance_fees_into_principal && terms.origination_fee > Decimal::ZERO {
        disbursement += terms.origination_fee;
    }
    flows.push(disbursement);
    flows.extend(std::iter::repeat(periodic_payment).take(terms.term_months as usize));

    flows
}

/// Effective annual rate with the default solver settings.
pub fn compute_effective_rate(terms: &LoanTerms, periodic_payment: Money) -> RateEstimate {
    compute_effective_rate_with(terms, periodic_payment, &SolverConfig::default())
}

/// Effective annual rate: the annualized IRR of the borrower's cash flows.
///
/// Newton-Raphson starts from the nominal monthly rate and clamps every step
/// into the configured band. Running out of iterations or hitting a flat
/// derivative is not an error: the last clamped rate is reported with
/// `converged = false`. The result is never below the nominal rate.
pub fn compute_effective_rate_with(
    terms: &LoanTerms,
    periodic_payment: Money,
    config: &SolverConfig,
) -> RateEstimate {
    if !terms.is_computable() || periodic_payment <= Decimal::ZERO {
        log::debug!("effective rate skipped: terms not computable or payment is zero");
        return RateEstimate::zeroed();
    }

    let cash_flows = borrower_cash_flows(terms, periodic_payment);
    let mut rate = terms.monthly_rate();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;
        let (npv_val, dnpv) = npv_with_derivative(rate, &cash_flows);

        if npv_val.abs() < config.tolerance {
            converged = true;
            break;
        }
        if dnpv.abs() <= config.derivative_tolerance {
            log::debug!("effective rate: flat derivative at rate {rate}");
            break;
        }

        rate -= npv_val / dnpv;
        rate = rate
            .max(config.min_periodic_rate)
            .min(config.max_periodic_rate);
        log::trace!("effective rate iteration {iterations}: npv {npv_val}, rate {rate}");
    }

    let residual_npv = npv(rate, &cash_flows).unwrap_or(Decimal::MAX);
    if !converged {
        log::warn!(
            "effective rate did not converge after {iterations} iterations \
             (rate {rate}, residual npv {residual_npv})"
        );
    }

    let solved = annualize(rate, MONTHS_PER_YEAR)
        .checked_mul(dec!(100))
        .unwrap_or(Decimal::MAX);
    let nominal = terms.nominal_annual_rate_percent;
    let floored_at_nominal = solved < nominal;

    RateEstimate {
        annual_rate_percent: solved.max(nominal),
        periodic_rate: rate,
        iterations,
        converged,
        residual_npv,
        floored_at_nominal,
    }
}

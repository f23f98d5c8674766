use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{annuity_payment, round_currency};
use crate::types::Money;

use super::terms::LoanTerms;

/// A single monthly row of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period_index: u32,
    /// Total charged this period: interest + principal + fee
    pub payment: Money,
    pub interest_portion: Money,
    pub fee_portion: Money,
    pub principal_portion: Money,
    pub remaining_balance: Money,
}

/// Periodic payment plus the full schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Rounded amount charged each period, periodic fee included.
    /// Zero means the terms were not computable.
    pub periodic_payment: Money,
    pub schedule: Vec<AmortizationRow>,
}

impl AmortizationResult {
    fn zeroed() -> Self {
        AmortizationResult {
            periodic_payment: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }
}

/// Level annuity payment for the financed balance, excluding the periodic
/// fee and before rounding. Zero for non-computable terms.
pub fn base_payment(terms: &LoanTerms) -> Money {
    if !terms.is_computable() {
        return Decimal::ZERO;
    }
    annuity_payment(
        terms.monthly_rate(),
        terms.term_months,
        terms.financed_principal(),
    )
}

/// Compute the periodic payment and the month-by-month schedule.
///
/// Amounts are rounded to whole currency units as they are produced, so
/// the final row absorbs the accumulated residue: it repays whatever
/// balance is left and its interest is backed out of the level payment.
/// Earlier rows never repay a negative amount and always leave at least one
/// unit outstanding, so the balance reaches zero on the last row only.
/// Non-computable terms yield a zero payment and an empty schedule.
pub fn compute_amortization(terms: &LoanTerms) -> AmortizationResult {
    if !terms.is_computable() {
        log::debug!("amortization skipped: terms not computable ({terms:?})");
        return AmortizationResult::zeroed();
    }

    let monthly_rate = terms.monthly_rate();
    let pmt = base_payment(terms);
    let periodic_payment = round_currency(pmt + terms.periodic_fee);

    let mut schedule = Vec::with_capacity(terms.term_months as usize);
    let mut balance = terms.financed_principal();

    for period_index in 1..=terms.term_months {
        let (interest_portion, principal_portion) = if period_index == terms.term_months {
            let principal = balance;
            let interest = round_currency(pmt - principal).max(Decimal::ZERO);
            (interest, principal)
        } else {
            let interest = round_currency(balance * monthly_rate);
            let ceiling = (balance - Decimal::ONE).max(Decimal::ZERO);
            let principal = round_currency(pmt - interest)
                .max(Decimal::ZERO)
                .min(ceiling);
            (interest, principal)
        };

        balance -= principal_portion;

        schedule.push(AmortizationRow {
            period_index,
            payment: interest_portion + principal_portion + terms.periodic_fee,
            interest_portion,
            fee_portion: terms.periodic_fee,
            principal_portion,
            remaining_balance: balance,
        });
    }

    log::debug!(
        "amortized {} over {} months: periodic payment {}",
        terms.financed_principal(),
        terms.term_months,
        periodic_payment
    );

    AmortizationResult {
        periodic_payment,
        schedule,
    }
}

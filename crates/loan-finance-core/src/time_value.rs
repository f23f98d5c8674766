use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::error::LoanFinanceError;
use crate::types::{Money, Rate};
use crate::LoanFinanceResult;

/// Round to whole currency units, halves away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Net Present Value of a series of cash flows.
///
/// Once the discount factor leaves Decimal range the remaining flows are
/// worth less than the smallest representable amount and are dropped.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> LoanFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(LoanFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        if discount.is_zero() {
            return Err(LoanFinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// NPV together with its first derivative with respect to the rate.
///
/// Returns zeros for rates at or below -100%, which callers treat as a flat
/// derivative.
pub fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> (Money, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return (Decimal::ZERO, Decimal::ZERO);
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        let pv = cf / discount;
        npv_val += pv;
        if t > 0 {
            dnpv -= Decimal::from(t as u64) * pv / one_plus_r;
        }
    }

    (npv_val, dnpv)
}

/// Level payment that fully amortizes `principal` over `nper` periods.
///
/// Zero rate falls back to straight-line repayment. If the compounding
/// factor overflows, the payment converges to interest-only, `principal * rate`.
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> Money {
    if nper == 0 {
        return Decimal::ZERO;
    }

    if rate.is_zero() {
        return principal / Decimal::from(nper);
    }

    let one_plus_r = Decimal::ONE + rate;
    match one_plus_r.checked_powi(i64::from(nper)) {
        Some(factor) if factor > Decimal::ONE => {
            // P·r·f / (f − 1), rearranged so a large factor cannot overflow
            principal * rate / (Decimal::ONE - Decimal::ONE / factor)
        }
        _ => principal * rate,
    }
}

/// Convert a periodic rate into a compounded annual rate. Saturates at
/// `Decimal::MAX` instead of overflowing.
pub fn annualize(periodic_rate: Rate, periods_per_year: u32) -> Rate {
    (Decimal::ONE + periodic_rate)
        .checked_powi(i64::from(periods_per_year))
        .map(|factor| factor - Decimal::ONE)
        .unwrap_or(Decimal::MAX)
}

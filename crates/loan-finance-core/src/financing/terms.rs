use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanFinanceError;
use crate::types::{Money, Percent, Rate};
use crate::LoanFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest term the engines will schedule (1,000 years). Longer terms are
/// treated like any other unusable input.
pub const MAX_TERM_MONTHS: u32 = 12_000;

/// Terms of a fixed-rate, monthly-amortizing loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount disbursed to the borrower, excluding fees
    pub principal: Money,
    /// Number of monthly periods
    pub term_months: u32,
    /// Stated annual rate, compounded monthly (5 = 5%)
    pub nominal_annual_rate_percent: Percent,
    /// One-time fee charged at signing
    #[serde(default)]
    pub origination_fee: Money,
    /// Fee added to every monthly payment
    #[serde(default)]
    pub periodic_fee: Money,
    /// Capitalise the origination fee into the interest-bearing balance
    /// instead of collecting it up front
    #[serde(default)]
    pub finance_fees_into_principal: bool,
}

impl LoanTerms {
    /// Balance that accrues interest and is repaid through the schedule.
    pub fn financed_principal(&self) -> Money {
        if self.finance_fees_into_principal {
            self.principal + self.origination_fee
        } else {
            self.principal
        }
    }

    /// Nominal monthly rate as a decimal.
    pub fn monthly_rate(&self) -> Rate {
        self.nominal_annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
    }

    /// Origination fee the borrower pays out of pocket at disbursement.
    pub fn upfront_fee(&self) -> Money {
        if self.finance_fees_into_principal {
            Decimal::ZERO
        } else {
            self.origination_fee
        }
    }

    /// Whether the engines can produce a non-zero result for these terms.
    pub fn is_computable(&self) -> bool {
        self.principal > Decimal::ZERO
            && self.term_months > 0
            && self.term_months <= MAX_TERM_MONTHS
            && self.nominal_annual_rate_percent >= Decimal::ZERO
    }

    /// Strict field validation for callers that prefer an error to the
    /// zeroed result. Reports the first offending field.
    pub fn validate(&self) -> LoanFinanceResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.term_months == 0 {
            return Err(LoanFinanceError::InvalidInput {
                field: "term_months".into(),
                reason: "Term must be at least 1 month".into(),
            });
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(LoanFinanceError::InvalidInput {
                field: "term_months".into(),
                reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
            });
        }
        if self.nominal_annual_rate_percent < Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "nominal_annual_rate_percent".into(),
                reason: "Nominal rate cannot be negative".into(),
            });
        }
        if self.origination_fee < Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "origination_fee".into(),
                reason: "Origination fee cannot be negative".into(),
            });
        }
        if self.periodic_fee < Decimal::ZERO {
            return Err(LoanFinanceError::InvalidInput {
                field: "periodic_fee".into(),
                reason: "Periodic fee cannot be negative".into(),
            });
        }
        Ok(())
    }

    /// Validation problems as envelope warnings. Invalid but computable
    /// terms (negative fees) are still calculated; anything else yields the
    /// zeroed result.
    pub fn validation_warnings(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) if self.is_computable() => vec![format!("{e}; computed anyway")],
            Err(e) => vec![format!("{e}; returning zeroed result")],
        }
    }

    /// Same terms with the fee-financing policy switched.
    pub fn with_fee_financing(&self, finance_fees_into_principal: bool) -> Self {
        LoanTerms {
            finance_fees_into_principal,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(30000),
            term_months: 24,
            nominal_annual_rate_percent: dec!(6),
            origination_fee: dec!(1900),
            periodic_fee: dec!(10),
            finance_fees_into_principal: false,
        }
    }

    #[test]
    fn test_financed_principal_follows_policy() {
        let upfront = terms();
        assert_eq!(upfront.financed_principal(), dec!(30000));
        assert_eq!(upfront.upfront_fee(), dec!(1900));

        let financed = upfront.with_fee_financing(true);
        assert_eq!(financed.financed_principal(), dec!(31900));
        assert_eq!(financed.upfront_fee(), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(terms().monthly_rate(), dec!(0.005));
    }

    #[test]
    fn test_validate_reports_first_bad_field() {
        let mut t = terms();
        t.principal = dec!(-500);
        t.term_months = 0;
        match t.validate() {
            Err(LoanFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert!(!t.is_computable());
    }

    #[test]
    fn test_negative_fee_is_invalid_but_computable() {
        let mut t = terms();
        t.periodic_fee = dec!(-1);
        assert!(t.validate().is_err());
        assert!(t.is_computable());
    }

    #[test]
    fn test_term_above_cap_is_not_computable() {
        let mut t = terms();
        t.term_months = MAX_TERM_MONTHS;
        assert!(t.is_computable());

        t.term_months = u32::MAX;
        assert!(!t.is_computable());
        match t.validate() {
            Err(LoanFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "term_months"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_warnings() {
        assert!(terms().validation_warnings().is_empty());

        let mut t = terms();
        t.periodic_fee = dec!(-1);
        let warnings = t.validation_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].ends_with("computed anyway"));

        t.principal = Decimal::ZERO;
        let warnings = t.validation_warnings();
        assert!(warnings[0].contains("principal"));
        assert!(warnings[0].ends_with("returning zeroed result"));
    }

    #[test]
    fn test_fees_default_when_omitted() {
        let json = r#"{"principal":"12000","term_months":12,"nominal_annual_rate_percent":"0"}"#;
        let t: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(t.origination_fee, Decimal::ZERO);
        assert_eq!(t.periodic_fee, Decimal::ZERO);
        assert!(!t.finance_fees_into_principal);
    }
}

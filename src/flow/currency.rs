//! Currency/unit description
//!
//! One controller serves both backend deployments; everything
//! variant-specific (display label, amount granularity, endpoints on the
//! gateway side) hangs off this description instead of parallel code paths.

use crate::config::{CurrencyConfig, CurrencyVariant};

/// Display and granularity rules for the deployment's withdrawal unit
#[derive(Debug, Clone)]
pub struct CurrencySpec {
    pub variant: CurrencyVariant,
    pub label: String,
}

impl CurrencySpec {
    pub fn from_config(config: &CurrencyConfig) -> Self {
        Self {
            variant: config.variant,
            label: config.label.clone(),
        }
    }

    pub fn fiat() -> Self {
        Self {
            variant: CurrencyVariant::Fiat,
            label: "USD".to_string(),
        }
    }

    pub fn diamond() -> Self {
        Self {
            variant: CurrencyVariant::Diamond,
            label: "diamonds".to_string(),
        }
    }

    /// Parse user input into an amount. Returns `None` for non-numeric text.
    pub fn parse_amount(&self, raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Whether a parsed amount is expressible in this unit. Diamonds are
    /// whole units; fiat amounts may be fractional.
    pub fn is_whole_enough(&self, amount: f64) -> bool {
        match self.variant {
            CurrencyVariant::Fiat => true,
            CurrencyVariant::Diamond => amount.fract() == 0.0,
        }
    }

    /// Render an amount the way the input field would show it: no trailing
    /// zeros for whole values ("100", not "100.00")
    pub fn format_amount(&self, amount: f64) -> String {
        if amount.fract() == 0.0 {
            format!("{}", amount as i64)
        } else {
            format!("{}", amount)
        }
    }

    /// Balance line for the view: "100 USD", "320 diamonds"
    pub fn display_balance(&self, amount: f64) -> String {
        format!("{} {}", self.format_amount(amount), self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        let usd = CurrencySpec::fiat();
        assert_eq!(usd.parse_amount("30"), Some(30.0));
        assert_eq!(usd.parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(usd.parse_amount("abc"), None);
        assert_eq!(usd.parse_amount(""), None);
        assert_eq!(usd.parse_amount("inf"), None);
    }

    #[test]
    fn test_whole_unit_rule() {
        assert!(CurrencySpec::fiat().is_whole_enough(12.5));
        assert!(CurrencySpec::diamond().is_whole_enough(12.0));
        assert!(!CurrencySpec::diamond().is_whole_enough(12.5));
    }

    #[test]
    fn test_format_amount_matches_input_field() {
        let usd = CurrencySpec::fiat();
        assert_eq!(usd.format_amount(100.0), "100");
        assert_eq!(usd.format_amount(100.5), "100.5");
        assert_eq!(usd.display_balance(50.0), "50 USD");
    }
}

//! Locale-aware currency formatting.

use cafecart_core::Money;

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Fixed two-decimal currency rendering with grouped thousands.
///
/// A presentation contract only; swap the preset per deployment locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub position: SymbolPosition,
    /// Text between symbol and number (pt-BR uses a no-break space).
    pub spacing: String,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl CurrencyFormat {
    /// Brazilian real, pt-BR conventions: `R$ 1.234,56`.
    pub fn brl() -> Self {
        Self {
            symbol: "R$".into(),
            position: SymbolPosition::Prefix,
            spacing: "\u{a0}".into(),
            decimal_separator: ',',
            group_separator: '.',
        }
    }

    /// US dollar, en-US conventions: `$1,234.56`.
    pub fn usd() -> Self {
        Self {
            symbol: "$".into(),
            position: SymbolPosition::Prefix,
            spacing: String::new(),
            decimal_separator: '.',
            group_separator: ',',
        }
    }

    pub fn format(&self, amount: Money) -> String {
        let plain = format!("{:.2}", amount.rounded_cents());
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut number = group_digits(int_part, self.group_separator);
        number.push(self.decimal_separator);
        number.push_str(frac_part);

        match self.position {
            SymbolPosition::Prefix => format!("{}{}{}", self.symbol, self.spacing, number),
            SymbolPosition::Suffix => format!("{}{}{}", number, self.spacing, self.symbol),
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::brl()
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

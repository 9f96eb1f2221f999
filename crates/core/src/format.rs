use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha256};
use std::str::FromStr;

pub fn compute_sha256_hex(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let bytes = hasher.finalize();
    hex::encode(bytes)
}

/// Formats an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let mut rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    rounded.rescale(2);
    let plain = rounded.to_string();
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{frac_part}")
}

/// Reads a masked currency input the way the registration form does: every
/// non-digit is dropped and the digits are taken as cents, so `R$ 1.234,56`,
/// `1234,56` and `123456` all yield `1234.56`.
pub fn parse_brl_amount(input: &str) -> Option<Decimal> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits)
        .ok()
        .map(|cents| cents / Decimal::ONE_HUNDRED)
}

/// `dd/MM/yyyy`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

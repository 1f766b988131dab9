//! Account and card number generation.
//!
//! These run before a record is built; the generated value is passed into
//! the record's constructor.

use rand::Rng;

pub const ACCOUNT_NUMBER_LENGTH: usize = 16;
pub const CARD_NUMBER_LENGTH: usize = 16;

/// A 16-digit account number whose first digit is never zero.
pub fn generate_account_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = String::with_capacity(ACCOUNT_NUMBER_LENGTH);
    number.push(digit(rng.gen_range(1..=9)));
    for _ in 1..ACCOUNT_NUMBER_LENGTH {
        number.push(digit(rng.gen_range(0..=9)));
    }
    number
}

/// A 16-digit card number starting with `prefix` and ending in a Luhn check
/// digit. Non-digit characters in `prefix` are ignored and an overlong
/// prefix is truncated.
pub fn generate_card_number<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let mut number: String = prefix
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_NUMBER_LENGTH - 1)
        .collect();

    while number.len() < CARD_NUMBER_LENGTH - 1 {
        number.push(digit(rng.gen_range(0..=9)));
    }
    number.push(digit(luhn_check_digit(&number)));
    number
}

/// The digit that makes `payload` followed by it pass the Luhn check.
fn luhn_check_digit(payload: &str) -> u32 {
    let sum: u32 = payload
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { double(d) } else { d })
        .sum();
    (10 - sum % 10) % 10
}

/// Whether `number` is all digits and passes the Luhn check.
pub fn luhn_valid(number: &str) -> bool {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = number
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 1 { double(d) } else { d })
        .sum();
    sum % 10 == 0
}

fn double(d: u32) -> u32 {
    let doubled = d * 2;
    if doubled > 9 {
        doubled - 9
    } else {
        doubled
    }
}

fn digit(d: u32) -> char {
    char::from_digit(d, 10).unwrap_or('0')
}

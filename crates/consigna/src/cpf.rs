//! Brazilian taxpayer registry number (CPF) checksum validation.

const CPF_LENGTH: usize = 11;

/// Returns `true` when `candidate` is an 11-digit CPF whose two check digits match.
///
/// Numbers made of a single repeated digit (e.g. `11111111111`) satisfy the
/// arithmetic but are never issued, so they are rejected as well.
pub fn is_valid(candidate: &str) -> bool {
    let Some(digits) = digits_of(candidate) else {
        return false;
    };

    if digits.iter().all(|digit| *digit == digits[0]) {
        return false;
    }

    check_digit_matches(&digits, 9) && check_digit_matches(&digits, 10)
}

fn digits_of(candidate: &str) -> Option<[u32; CPF_LENGTH]> {
    if candidate.len() != CPF_LENGTH {
        return None;
    }

    let mut digits = [0u32; CPF_LENGTH];
    for (slot, ch) in digits.iter_mut().zip(candidate.chars()) {
        *slot = ch.to_digit(10)?;
    }
    Some(digits)
}

fn check_digit_matches(digits: &[u32; CPF_LENGTH], position: usize) -> bool {
    let sum: u32 = digits[..position]
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * ((position + 1 - index) as u32))
        .sum();

    let expected = ((10 * sum) % 11) % 10;
    digits[position] == expected
}

//! Pure computations behind the `fib` and `caesar` built-ins.

use std::collections::TryReserveError;
use thiserror::Error;

/// Returned by [`compute_fibonacci`] when the result does not fit in an `i64`.
///
/// Every real Fibonacci number is non-negative, so the sentinel can never be
/// mistaken for a value.
pub const FIB_OVERFLOW: i64 = -1;

/// Size of the Latin alphabet the cipher rotates within.
const ALPHABET_LEN: i64 = 26;

/// The `n`-th Fibonacci number (F(0) = 0, F(1) = 1), or `None` past `i64::MAX`.
///
/// Runs in O(n) time and constant space, and stops as soon as an addition
/// overflows, so very large `n` still return promptly.
pub fn checked_fibonacci(n: u64) -> Option<i64> {
    if n == 0 {
        return Some(0);
    }
    // `b` holds F(k) for k in 1..=n; F(n + 1) is never computed.
    let (mut a, mut b) = (0i64, 1i64);
    for _ in 1..n {
        let next = a.checked_add(b)?;
        a = b;
        b = next;
    }
    Some(b)
}

/// The `n`-th Fibonacci number, or [`FIB_OVERFLOW`] when it is too large to represent.
pub fn compute_fibonacci(n: u64) -> i64 {
    checked_fibonacci(n).unwrap_or(FIB_OVERFLOW)
}

#[derive(Debug, Error)]
pub enum CaesarError {
    #[error("failed to reserve {len} bytes for the encrypted text")]
    Allocation {
        len: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Rotate an ASCII letter by `shift` places within its own case. Anything else is returned as is.
pub fn shift_char(ch: char, shift: i64) -> char {
    let base = match ch {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return ch,
    };
    let offset = (i64::from(ch as u8 - base) + shift.rem_euclid(ALPHABET_LEN)) % ALPHABET_LEN;
    // offset is in 0..26
    char::from(base + offset as u8)
}

/// Exact byte length of `words` joined by single spaces.
fn joined_len<S: AsRef<str>>(words: &[S]) -> usize {
    let letters: usize = words.iter().map(|word| word.as_ref().len()).sum();
    letters + words.len().saturating_sub(1)
}

/// Encrypt every word with a Caesar shift and join the results with single spaces.
///
/// The shift may have any sign; it is reduced modulo 26. Shifting never changes a
/// character's UTF-8 width, so the output is reserved up front at its final size.
pub fn caesar_encrypt<S: AsRef<str>>(shift: i64, words: &[S]) -> Result<String, CaesarError> {
    let len = joined_len(words);
    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|source| CaesarError::Allocation { len, source })?;

    let shift = shift.rem_euclid(ALPHABET_LEN);
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(word.as_ref().chars().map(|ch| shift_char(ch, shift)));
    }
    debug_assert_eq!(out.len(), len);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_matches_the_standard_sequence() {
        let expected: [i64; 31] = [
            0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181,
            6765, 10946, 17711, 28657, 46368, 75025, 121393, 196418, 317811, 514229, 832040,
        ];
        for (n, value) in expected.iter().enumerate() {
            assert_eq!(compute_fibonacci(n as u64), *value, "F({n})");
        }
        assert_eq!(compute_fibonacci(10), 55);
    }

    #[test]
    fn test_fibonacci_largest_representable_value() {
        assert_eq!(compute_fibonacci(92), 7_540_113_804_746_346_429);
        assert_eq!(checked_fibonacci(92), Some(7_540_113_804_746_346_429));
    }

    #[test]
    fn test_fibonacci_stops_exactly_at_the_boundary() {
        assert_eq!(checked_fibonacci(90), Some(2_880_067_194_370_816_120));
        assert_eq!(checked_fibonacci(91), Some(4_660_046_610_375_530_309));
        assert_eq!(
            checked_fibonacci(92),
            checked_fibonacci(90)
                .zip(checked_fibonacci(91))
                .map(|(a, b)| a + b)
        );
        assert_eq!(checked_fibonacci(93), None);
    }

    #[test]
    fn test_fibonacci_overflow_returns_sentinel() {
        for n in [93, 94, 100, 1_000, u64::MAX] {
            assert_eq!(compute_fibonacci(n), FIB_OVERFLOW, "F({n})");
            assert_eq!(checked_fibonacci(n), None);
        }
        assert!(FIB_OVERFLOW < 0);
    }

    #[test]
    fn test_caesar_known_vectors() {
        assert_eq!(caesar_encrypt(2, &["Hello"]).unwrap(), "Jgnnq");
        assert_eq!(caesar_encrypt(-1, &["abc"]).unwrap(), "zab");
        assert_eq!(
            caesar_encrypt(3, &["Hello,", "World!"]).unwrap(),
            "Khoor, Zruog!"
        );
    }

    #[test]
    fn test_caesar_shift_is_reduced_modulo_26() {
        assert_eq!(caesar_encrypt(26, &["Zebra"]).unwrap(), "Zebra");
        assert_eq!(caesar_encrypt(27, &["Zebra"]).unwrap(), "Afcsb");
        assert_eq!(caesar_encrypt(-27, &["Afcsb"]).unwrap(), "Zebra");
        assert_eq!(
            caesar_encrypt(i64::from(i32::MIN), &["abc"]).unwrap(),
            caesar_encrypt(i64::from(i32::MIN).rem_euclid(26), &["abc"]).unwrap()
        );
    }

    #[test]
    fn test_caesar_leaves_non_letters_alone() {
        assert_eq!(caesar_encrypt(5, &["123-_!?"]).unwrap(), "123-_!?");
        assert_eq!(caesar_encrypt(1, &["héllo"]).unwrap(), "iémmp");
    }

    #[test]
    fn test_caesar_output_is_sized_exactly() {
        let words = ["one", "two", "three"];
        let out = caesar_encrypt(4, &words).unwrap();
        assert_eq!(out.len(), 3 + 3 + 5 + 2);
        assert_eq!(out.capacity(), out.len());
        assert!(!out.starts_with(' ') && !out.ends_with(' '));

        let single = caesar_encrypt(4, &["solo"]).unwrap();
        assert_eq!(single.len(), 4);
    }

    #[test]
    fn test_caesar_with_no_words_is_empty() {
        let words: [&str; 0] = [];
        assert_eq!(caesar_encrypt(3, &words).unwrap(), "");
    }

    #[test]
    fn test_caesar_round_trips_with_negated_shift() {
        let plain = ["The", "quick", "brown", "fox."];
        let secret = caesar_encrypt(11, &plain).unwrap();
        let words: Vec<&str> = secret.split(' ').collect();
        assert_eq!(caesar_encrypt(-11, &words).unwrap(), plain.join(" "));
    }
}

//! Functions to construct [`Integer`]s from the literal strings stored in expression trees.

use rug::Integer;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates an [`Integer`] from a string of decimal digits.
///
/// The tokenizer guarantees that literal values in the tree are plain decimal digit strings, so
/// this never fails on values taken from a parsed tree.
pub fn int_from_str(s: &str) -> Integer {
    Integer::from_str_radix(s, 10).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values() {
        assert_eq!(int_from_str("0"), 0);
        assert_eq!(int_from_str("144"), 144);
        assert_eq!(int_from_str("007"), 7);
    }
}

// src/core/canonical.rs
use crate::core::types::Pattern;

/// Picks the rotation whose first position is the smallest of the three.
/// Patterns never repeat a position, so exactly one rotation qualifies and at
/// most two rotations are needed. Idempotent.
pub fn canonicalize(pattern: Pattern) -> Pattern {
    let [a, b, c] = pattern.indices();
    let min = a.min(b).min(c);
    let offset = if a == min {
        0
    } else if b == min {
        1
    } else {
        2
    };
    pattern.rotate(offset)
}

/// Reverses the cycle direction by swapping the second and third positions.
/// Involutive, and it keeps the first position, so the inverse of a canonical
/// pattern is itself canonical.
pub fn invert(pattern: Pattern) -> Pattern {
    let [a, b, c] = pattern.indices();
    Pattern::from_indices_unchecked([a, c, b])
}

pub fn is_canonical(pattern: Pattern) -> bool {
    canonicalize(pattern) == pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::POSITIONS;

    fn all_patterns() -> impl Iterator<Item = Pattern> {
        let n = POSITIONS as u8;
        (0..n).flat_map(move |a| {
            (0..n).flat_map(move |b| (0..n).filter_map(move |c| Pattern::new([a, b, c]).ok()))
        })
    }

    #[test]
    fn test_cab_canonicalizes_to_abc() {
        let p = Pattern::parse("CAB").unwrap();
        assert_eq!(canonicalize(p).to_string(), "ABC");
        assert_eq!(canonicalize(Pattern::parse("BCA").unwrap()).to_string(), "ABC");
        assert_eq!(canonicalize(Pattern::parse("ABC").unwrap()).to_string(), "ABC");
        // the other direction is a different cycle
        assert_eq!(canonicalize(Pattern::parse("CBA").unwrap()).to_string(), "ACB");
    }

    #[test]
    fn test_canonical_form_is_a_rotation_and_idempotent() {
        for p in all_patterns() {
            let c = canonicalize(p);
            assert!((0..3).any(|n| p.rotate(n) == c), "{} -> {}", p, c);
            assert_eq!(canonicalize(c), c);
            let [first, second, third] = c.indices();
            assert!(first < second && first < third);
        }
    }

    #[test]
    fn test_rotation_invariance() {
        for p in all_patterns() {
            let c = canonicalize(p);
            assert_eq!(canonicalize(p.rotate(1)), c);
            assert_eq!(canonicalize(p.rotate(2)), c);
        }
    }

    #[test]
    fn test_invert_is_involutive_and_keeps_canonical_form() {
        for p in all_patterns() {
            assert_eq!(invert(invert(p)), p);
            let c = canonicalize(p);
            assert!(is_canonical(invert(c)));
            assert_ne!(invert(c), c);
        }
        assert_eq!(invert(Pattern::parse("ABC").unwrap()).to_string(), "ACB");
    }
}

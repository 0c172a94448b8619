//! The d66 roll used by the random tables: two d6 read as tens and ones.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::dice::roll_d6;

/// A d66 result, 11 through 66.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct D66 {
    /// The tens die.
    pub tens: u32,
    /// The ones die.
    pub ones: u32,
}

impl D66 {
    /// The two-digit table value.
    pub fn value(self) -> u32 {
        self.tens * 10 + self.ones
    }
}

impl fmt::Display for D66 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tens, self.ones)
    }
}

/// Roll a d66.
pub fn roll_d66<R: Rng + ?Sized>(rng: &mut R) -> D66 {
    D66 {
        tens: roll_d6(rng),
        ones: roll_d6(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn digits_are_d6_faces() {
        let mut rng = StdRng::seed_from_u64(66);
        for _ in 0..200 {
            let d = roll_d66(&mut rng);
            assert!((1..=6).contains(&d.tens));
            assert!((1..=6).contains(&d.ones));
            assert!((11..=66).contains(&d.value()));
        }
    }

    #[test]
    fn display() {
        let d = D66 { tens: 3, ones: 5 };
        assert_eq!(d.to_string(), "35");
        assert_eq!(d.value(), 35);
    }
}

//! Six-sided dice, pools, and rolls.
//!
//! Every Streetwise roll is a pool of d6s split into regular dice (attribute
//! plus skill plus modifiers) and strain dice (one per point of scene strain).
//! A 6 is a success and a 1 is a bane. Banes on strain dice trigger scene
//! panic; banes on either pool feed scene strain when a roll is pushed.

pub mod pool;
pub mod roll;

pub use pool::{DicePool, RollParameters};
pub use roll::{DiceFaces, DiceRoll, LockMask, PushBreakdown};

use rand::Rng;

/// Face value that counts as a success.
pub const SUCCESS: u32 = 6;

/// Face value that counts as a bane.
pub const BANE: u32 = 1;

/// Roll a single d6.
pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(1..=6)
}

/// Roll `count` d6s.
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<u32> {
    (0..count).map(|_| roll_d6(rng)).collect()
}

/// Count successes (6s) among face values.
pub fn count_successes(faces: &[u32]) -> u32 {
    faces.iter().filter(|&&d| d == SUCCESS).count() as u32
}

/// Count banes (1s) among face values.
pub fn count_banes(faces: &[u32]) -> u32 {
    faces.iter().filter(|&&d| d == BANE).count() as u32
}

/// Returns true if a face stays put when the roll is pushed.
pub fn is_locked_face(face: u32) -> bool {
    face == SUCCESS || face == BANE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn d6_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!((1..=6).contains(&roll_d6(&mut rng)));
        }
    }

    #[test]
    fn roll_dice_count() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(roll_dice(&mut rng, 5).len(), 5);
        assert!(roll_dice(&mut rng, 0).is_empty());
    }

    #[test]
    fn counting() {
        let faces = [6, 1, 3, 6, 1, 1, 5];
        assert_eq!(count_successes(&faces), 2);
        assert_eq!(count_banes(&faces), 3);
        assert_eq!(count_successes(&[]), 0);
    }

    #[test]
    fn locked_faces() {
        assert!(is_locked_face(1));
        assert!(is_locked_face(6));
        for face in 2..=5 {
            assert!(!is_locked_face(face));
        }
    }
}

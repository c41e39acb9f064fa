use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Supplies fresh 32-bit words to the ignition row, like the badge's RNG register.
pub trait RandomSource {
    fn next_word(&mut self) -> u32;
}

impl<R: RngCore> RandomSource for R {
    fn next_word(&mut self) -> u32 {
        self.next_u32()
    }
}

pub fn seeded(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

pub fn from_entropy() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(rand::random())
}

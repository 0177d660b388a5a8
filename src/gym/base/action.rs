use rand::Rng;
use std::fmt::Debug;

/// A discrete action with a fixed, ordered set of variants
pub trait Action: Debug + Copy + Clone + From<usize> + Into<usize> {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen_range(0..Self::size()).into()
    }

    fn enumerate() -> Vec<Self>;

    fn size() -> usize {
        Self::enumerate().len()
    }
}

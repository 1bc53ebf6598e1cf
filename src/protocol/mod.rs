mod mask;
mod rng;

pub use mask::mask;
pub use rng::{MaskKeyGenerator, XorShift128Plus};

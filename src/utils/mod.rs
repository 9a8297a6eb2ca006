pub mod normalize;

pub use normalize::{CodeNormalizer, NormalizedCode};

pub mod coordinates;

pub use coordinates::{CoordinateIndex, DatasetError, PageWord, WordCoordinate};
pub use hit_test::{hit_test, WordHit};

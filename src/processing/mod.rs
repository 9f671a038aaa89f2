pub mod encoding;

pub use encoding::{encode, EncodedSeries};

pub mod decode;

pub use decode::{TrackBuffer, TrackDecoder};

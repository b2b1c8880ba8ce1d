#![doc = include_str!("../README.md")]

mod map;
mod raw;

pub use map::{HashMap, Iter, Keys, Values};
pub use raw::EncodingError;

//! Shared utility code throughout the bitstash project.
//!
//! Everything in here is pure arithmetic on integers and floats
//! that the bit stream builds its codecs from.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod half;
pub mod math;
pub mod zigzag;

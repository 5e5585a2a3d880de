//! Query string codec.
//!
//! This module converts between raw query strings and nested parameter maps:
//! - `decode`: PHP-style bracket-array decoding (`a[]=1&a[b]=2`)
//! - `encode`: canonical form-encoded query string from a parameter map
//! - `pairs` / `encode_pairs`: flat, order-preserving pair handling
//!
//! Decoding never fails. Malformed bracket keys degrade to a best-effort
//! literal key instead of an error.

mod decode;
mod encode;
mod value;

pub use decode::{decode, pairs};
pub use encode::{encode, encode_pairs};
pub(crate) use encode::flatten;
pub use value::{QueryMap, QueryValue};

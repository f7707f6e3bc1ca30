//! Low-level byte encoding shared by every custom debug information format.
//!
//! Custom debug information mixes two integer representations: the record framing and the
//! legacy record payloads use fixed-width little-endian fields, while the Edit-and-Continue
//! maps use ECMA-335 compressed integers. This module provides both, together with the
//! [`crate::Parser`] cursor all decoders read through.
//!
//! # Key Components
//!
//! - [`crate::encoding::io`] - Fixed-width little-endian reads and writes
//! - [`crate::encoding::compressed`] - Compressed unsigned and sign-folded integers
//! - [`crate::encoding::parser`] - Bounds-checked cursor with transactional reads

pub mod compressed;
pub mod io;
pub mod parser;

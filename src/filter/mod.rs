//! Row filtering for record batches
//!
//! Sample restrictions are expressed as [`Expr`] trees and applied with
//! [`filter_record_batch`].

pub mod core;
pub mod expr;

pub use self::core::{constant_mask, filter_record_batch};
pub use expr::{Expr, LiteralValue};

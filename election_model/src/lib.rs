//! Canonical election model shared by the ballot format adapters.
//!
//! Every input format converges on the same representation: a set of
//! named candidates and an ordered collection of [Ballot]s, each an
//! ordered sequence of candidate references. The [Builder] accumulates
//! the raw records produced by an adapter and performs all validation
//! (duplicate ids, declared counts, rank density, reference
//! resolution) in one finalization step.

mod builder;
mod model;

pub use crate::builder::Builder;
pub use crate::model::*;

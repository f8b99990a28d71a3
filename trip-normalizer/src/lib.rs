//! Transit trip normalizer.
//!
//! Takes the routes and trips of a public-transit schedule feed and gives
//! every trip a canonical direction (0 or 1) and destination label, and every
//! trip of a templated route a canonical stop order. Agency knowledge lives
//! in declarative rule tables (see [`rules::thunder_bay`]).

pub mod batch;
pub mod config;
pub mod domain;
pub mod normalize;
pub mod rules;

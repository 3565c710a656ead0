// Sieve: spam detection and title recommendation over prebuilt artifacts.
//
// This is the library root. Each module corresponds to one stage of the two
// demo pipelines or to the glue around them.

pub mod artifacts;
pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod posters;
pub mod recommend;
pub mod text;

#[cfg(feature = "web")]
pub mod web;

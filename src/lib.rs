//! fglscope - Outline and unused-variable analyzer for Genero/Informix 4GL
//!
//! This crate recovers the block structure and declarations of 4GL
//! sources from line heuristics, and reports variables that are declared
//! but never referenced.

pub mod analysis;
pub mod config;
pub mod export;
pub mod locate;
pub mod outline;
pub mod parser;
#[cfg(feature = "watch-mode")]
pub mod watch;
pub mod workspace;

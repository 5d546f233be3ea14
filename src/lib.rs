//! refgen - concurrent reference documentation generator.
//!
//! Renders a catalog of C++ entities into one page per entity or into a single
//! document, using a pool of stateful renderers, and writes a Doxygen tag file
//! describing where every entity landed.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod generator;
pub mod logger;
pub mod render;

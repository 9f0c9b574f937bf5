//! # dotgraph
//!
//! The dotgraph command line application, as a library so its pieces can be
//! tested directly.
//!
//! - `cli`: clap commands (`build`, `explore`)
//! - `config`: TOML graph descriptions
//! - `render`: the Graphviz process bridge and viewer

pub mod cli;
pub mod config;
pub mod render;

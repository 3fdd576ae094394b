//! Core library for the `wmetrics` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration parsing, the instrumented request engine and
//! scheduler, statistics aggregation, and report rendering. The primary
//! user-facing interface is the `wmetrics` command-line application.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod output;
pub mod statistics;

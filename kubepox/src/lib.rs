//! Inspects the network policies of a Kubernetes namespace.
//!
//! Pods and policies are read from the cluster, handed to [`kubepox_core`] and the results are
//! printed to stdout. Logs go to stderr.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use kubepox_core as core;

mod args;
mod fetch;
mod render;

pub use self::args::Args;

//! # aspect-weave
//!
//! A build step that weaves AspectJ aspects into compiled Android artifacts,
//! positioned before later bytecode-processing steps so that
//! package-qualified exclusion rules still see original artifact boundaries.
//!
//! ## Architecture
//!
//! - **artifact**: compiled-input model (directory or archive) and archive inspection
//! - **exclude**: group/module exclusion rules matched as path fragments
//! - **router**: partition inputs into to-weave vs classpath-only sets
//! - **invocation**: weaver argument assembly (inpath, classpath, bootclasspath)
//! - **ajc**: external AspectJ compiler invocation behind the `Weaver` seam
//! - **diagnostic**: weaver message model and console-stream parsing
//! - **report**: severity routing and the run outcome
//! - **output**: collision-free output-slot provider
//! - **transform**: the orchestrated pipeline
//! - **config**: run configuration and tool resolution

pub mod ajc;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod exclude;
pub mod invocation;
pub mod output;
pub mod report;
pub mod router;
pub mod transform;

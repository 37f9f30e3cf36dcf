//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait interfaces that launch-strategy adapters
//! must implement:
//! - `MavenLauncher`: running one build and querying the Maven version
//! - `MavenRuntime` / `MavenRuntimeFactory`: the in-process runtime behind
//!   the embedded launcher
//!
//! These traits define the contracts that allow the verification logic to be
//! independent of how builds are actually executed.

pub mod launcher;
pub mod runtime;

pub use launcher::MavenLauncher;
pub use runtime::{MavenRuntime, MavenRuntimeFactory, RuntimeOutcome};

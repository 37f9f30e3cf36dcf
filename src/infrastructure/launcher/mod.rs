//! Launch strategy adapters
//!
//! Two implementations of the `MavenLauncher` port: forking a process per
//! build, and driving a cached in-process runtime.

pub mod embedded;
pub mod forked;

pub use embedded::{EmbeddedCache, EmbeddedLauncher};
pub use forked::ForkedLauncher;

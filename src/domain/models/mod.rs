pub mod config;
pub mod coordinate;
pub mod invocation;
pub mod layout;

pub use config::{BuildConfig, HarnessConfig, LauncherConfig};
pub use coordinate::ArtifactCoordinate;
pub use invocation::InvocationRequest;
pub use layout::{is_metadata_file_name, LocalRepository, RepositoryLayout};

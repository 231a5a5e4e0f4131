//! Release catalog: metadata types, version handling and lookup sources.

pub mod archive;
pub mod cache;
pub mod externals;
pub mod http;
pub mod model;
pub mod project;
pub mod source;
pub mod version;

pub use cache::ReleaseCache;
pub use http::HttpReleaseSource;
pub use model::{EditorRelease, InstallOptions, ModuleRelease, Package, Releases};
pub use project::ProjectVersion;
pub use source::ReleaseSource;
pub use version::{compare_versions, is_prerelease};

//! GitHub release download and archive extraction
//!
//! ## Module Organization
//!
//! - `platform` - Host detection and the ordered bucket → slug table
//! - `github` - Release version discovery
//! - `core` - HTTP transport (in-memory fetch and streaming download)
//! - `extract` - `.tar.gz` / `.zip` extraction

pub mod core;
pub mod extract;
pub mod github;
pub mod platform;

pub use self::core::{HttpTransport, Transport};
pub use extract::{ArchiveExtractor, Extractor};
pub use github::{Version, resolve_version};
pub use platform::{HostId, OsBucket, PLATFORMS, Platform, target_platforms};

//! Services module - proto file discovery and grouping by owning configuration.
//!
//! # Components
//!
//! - [`is_excluded`]: pure exclude-prefix containment check
//! - [`ProtoWalker`]: time-bounded walk collecting `.proto` files, accumulating
//!   excludes from the configuration of every directory it visits
//! - [`group_proto_files`]: partitions a flat file list into [`ProtoSet`]s by
//!   owning configuration file
//! - [`ProtoSetProvider`]: the entry point; picks the scan root, walks, groups
//!   and stamps the results
//!
//! # Flow
//!
//! 1. Normalize the work directory and the requested directory
//! 2. Raise the scan root to the owning configuration's directory (or use the
//!    work directory when inline configuration data is set)
//! 3. Walk the scan root on the blocking pool, racing a timeout
//! 4. Group the walked files by owning configuration, sorted by config dir
//!
//! # Known traversal-order dependency
//!
//! Excludes are learned during the single walk and never applied backwards.
//! A file recorded before a configuration deeper in a different branch
//! declares an exclude covering it stays in the result.
//!
//! [`ProtoSet`]: crate::models::ProtoSet

pub mod exclude;
pub mod grouping;
pub mod provider;
pub mod walker;

pub use exclude::is_excluded;
pub use grouping::group_proto_files;
pub use provider::ProtoSetProvider;
pub use walker::{PROTO_EXTENSION, ProtoWalker};

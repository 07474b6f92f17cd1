//! Repository access: where a repository comes from, which APIs it lists,
//! and the isolated directories each API is validated in.

mod descriptor;
mod source;
mod workspace;

pub use descriptor::RepositoryDescriptor;
#[cfg(feature = "fetch")]
pub use source::HttpFetcher;
pub use source::{
    content_root, default_fetcher, ArchiveExtractor, ArchiveFetcher, OfflineFetcher,
    RepositoryLocation, RepositorySource, ZipExtractor,
};
pub use workspace::WorkArea;

//! Access to the host CMS's document store.
//!
//! [`ContentStore`] is the seam the pipeline and the owned-collections
//! service program against. [`StrapiClient`] speaks the Strapi REST API;
//! [`MemoryStore`] keeps everything in process for tests.

pub mod client;
pub mod error;
pub mod memory;
pub mod owned;
pub mod profile;
pub mod store;
pub mod types;

pub use client::StrapiClient;
pub use error::StrapiError;
pub use memory::{MemoryStore, RecordedWrite};
pub use owned::{BatchOutcome, OwnedCollections, OwnedError, OwnedKind};
pub use profile::{UserProfile, UserProfiles};
pub use store::ContentStore;
pub use types::{Filter, Page, Pagination, Populate, Query, Sort, SortOrder};

//! Enterprise SCIM directory as a group source.
//!
//! - [`client`] - `ScimClient`, implements [`crate::group::GroupSource`]
//! - [`types`] - list envelope and group resources, decoded case-insensitively

mod client;
mod types;

pub use client::{DEFAULT_SCIM_BASE_URL, ScimClient};
pub use types::{
    GROUP_SCHEMA, ScimGroup, ScimGroupMember, ScimListResponse, ScimMeta, lowercase_keys,
};

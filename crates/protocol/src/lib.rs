//! Wire types shared between the GuestSnap client core and the photo service.
//!
//! All request/response payloads use camelCase field names on the wire to
//! match the service's JSON contract.

mod messages;
mod types;

pub use messages::{
    BeginUploadRequest, BeginUploadResponse, CompleteUploadRequest, CompletedItem, FileDescriptor,
    ListPhotosRequest, ListPhotosResponse, ReservedSlot,
};
pub use types::{EventInfo, PhotoMeta};

//! API request and response data models.
//!
//! Request models double as the outbound webhook payloads: a validated model is serialized as-is,
//! plus a `timestamp`, so field names here are part of the webhook contract.

pub mod contact;
pub mod handyman;
pub mod job_requests;
pub mod responses;

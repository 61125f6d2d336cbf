//! Core domain types for the job board.
//!
//! This crate contains shared types used across all packages:
//! - Job and JobId for posted tasks
//! - User and UserProfile for accounts and their job back-references
//! - Events for real-time updates
//! - Response payloads for the routing layer

mod events;
mod job;
pub mod response;
mod user;

pub use events::BoardEvent;
pub use job::{Job, JobId};
pub use response::{ActionResponse, ErrorResponse};
pub use user::{User, UserProfile};

//! Repository implementations for board operations.

mod job_repo;
mod user_repo;

pub use job_repo::JobRepository;
pub use user_repo::UserRepository;

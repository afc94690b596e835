pub mod advisor;
pub mod auth;
pub mod coordinator;
pub mod courses;
pub mod messages;
pub mod parent;
pub mod student;

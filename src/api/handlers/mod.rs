pub mod attendance;
pub mod auth;
pub mod locations;
pub mod payments;
pub mod reports;
pub mod students;

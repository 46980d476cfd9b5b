//! HTTP handler tests driven through the router

pub mod auth_test;
pub mod events_test;
pub mod notifications_test;
pub mod participation_test;

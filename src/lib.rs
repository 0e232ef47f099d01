// Library for tests to access modules

pub mod api_client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod routes;
pub mod status_repo;
pub mod version;
pub mod worker;

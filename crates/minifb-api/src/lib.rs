pub mod error;
pub mod extract;
pub mod feed;
pub mod friends;
pub mod middleware;
pub mod profiles;
pub mod routes;
pub mod state;
pub mod statuses;

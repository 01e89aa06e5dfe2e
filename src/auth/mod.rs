pub mod auth;
pub mod gateway;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;

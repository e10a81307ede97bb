pub mod accounts;
pub mod ads;
pub mod app_config;
pub mod constants;
pub mod db;
pub mod email;
pub mod error;
pub mod mailing;
pub mod managers;
pub mod middleware;
pub mod orm;
pub mod pagination;
pub mod permission;
pub mod responses;
pub mod session;
pub mod subscriptions;
pub mod web;

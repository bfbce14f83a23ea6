// K-pop group trivia bot: game engine, photo library and Bot API webhook service.

pub mod api;
pub mod auth;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod media;
pub mod metrics;
pub mod rate_limit;
pub mod telegram;

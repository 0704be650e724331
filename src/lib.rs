pub mod admin;
pub mod analytics;
pub mod app;
pub mod auth;
pub mod bookings;
pub mod config;
pub mod content;
pub mod error;
pub mod gallery;
pub mod mailer;
pub mod response;
pub mod services;
pub mod social;
pub mod state;
pub mod storage;
pub mod testimonials;

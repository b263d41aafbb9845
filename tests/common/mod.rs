#![allow(dead_code)]

pub mod app;
pub mod auth;
pub mod http;

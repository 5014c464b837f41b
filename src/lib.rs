pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod repository;
pub mod search;
pub mod types;
pub mod web;

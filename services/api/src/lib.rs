//! services/api/src/lib.rs
//!
//! The ByteGurukul REST API: accounts and bearer tokens, the course catalog with
//! enrollments, internship applications and question-paper uploads.

pub mod adapters;
pub mod admin;
pub mod config;
pub mod error;
pub mod password;
pub mod token;
pub mod web;

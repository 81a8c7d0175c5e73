#![doc = include_str!("../README.md")]

pub mod compare;
pub mod detect;
pub mod face;
pub mod faceset;
pub mod models;
pub mod request;
pub mod search;

pub use request::{Endpoint, FaceRequest};

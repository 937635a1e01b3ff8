//! HTTP surface of unimatch.

pub mod rest;

pub use rest::RestApi;

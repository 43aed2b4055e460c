//! Client for the Imagen image-generation REST API.

pub mod client;

pub use client::{ImagenClient, ImagenError};

mod client;
mod models;

pub use client::{choose_audio_format, ResolverClient, Result};
pub use models::ResolverConfig;

mod client;
mod pacer;
mod prober;

pub use client::{HttpClient, USER_AGENTS, random_user_agent};
pub use pacer::Pacer;
pub use prober::{Prober, TlsPolicy};

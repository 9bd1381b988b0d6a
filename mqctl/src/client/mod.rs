// Client library module
mod client;

pub use client::{HttpMessagingClient, MessagingApi, MessagingClientBuilder};

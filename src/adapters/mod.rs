// Adapters layer: Shopify REST client, inbound HTTP server and progress transports.

pub mod server;
pub mod shopify;
pub mod stream;

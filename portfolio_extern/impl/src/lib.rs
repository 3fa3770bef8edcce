pub mod http;
pub mod relay;
pub mod telegram;

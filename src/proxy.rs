pub mod dto;

#[cfg(feature = "server-http2")]
pub mod back;

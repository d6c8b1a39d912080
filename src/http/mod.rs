pub mod headers;
pub mod request;
pub mod response;

// Re-exports for convenience
pub use headers::LOCAL_ADDRESS_HEADER;
pub use request::serialize_request;
pub use response::parse_response;

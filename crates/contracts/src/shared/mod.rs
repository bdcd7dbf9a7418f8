pub mod api_response;
pub mod serde_helpers;

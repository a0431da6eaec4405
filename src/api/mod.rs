mod client;
pub mod endpoints;
mod error;
mod transport;

pub use client::{decode, decode_entity, decode_list, ApiClient};
pub use error::{error_message, ApiError, ApiResult, ValidationIssue};
pub use transport::{
    ApiRequest, ApiResponse, Body, FormPart, HttpTransport, Method, MultipartForm, PartBody,
    Transport,
};

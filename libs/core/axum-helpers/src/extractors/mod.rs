//! Extractors whose rejections use the standard error body.

mod json;
mod query;

pub use json::JsonBody;
pub use query::QueryParams;

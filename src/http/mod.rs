//! HTTP range-request upstream
//!
//! [`HttpRangeSource`] turns positioned reads into `GET` requests carrying a
//! `Range` header and discovers the resource size from `Content-Range`.

mod range;
mod source;

pub use range::{parse_content_range_total, range_header};
pub use source::HttpRangeSource;

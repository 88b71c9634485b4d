//! `Range` / `Content-Range` header helpers

use crate::error::{ReadError, ReadResult};

/// Format an inclusive byte range as a `Range` header value
pub fn range_header(first: u64, last: u64) -> String {
    format!("bytes={first}-{last}")
}

/// Extract the total resource length from a `Content-Range` header value.
///
/// Accepts `bytes <range>/<total>`. An unknown total (`*`), a unit other than
/// `bytes` or any other shape is rejected.
pub fn parse_content_range_total(value: &str) -> ReadResult<u64> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    let [unit, range] = fields.as_slice() else {
        return Err(ReadError::InvalidContentRange);
    };

    if !unit.eq_ignore_ascii_case("bytes") {
        return Err(ReadError::InvalidContentRange);
    }

    let amounts: Vec<&str> = range.split('/').collect();
    let [_, total] = amounts.as_slice() else {
        return Err(ReadError::InvalidContentRange);
    };

    if *total == "*" {
        return Err(ReadError::InvalidContentRange);
    }

    total.parse().map_err(|_| ReadError::InvalidContentRange)
}

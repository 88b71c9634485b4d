//! Ranged HTTP fetcher

use std::io::{self, Read};

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::StatusCode;

use crate::error::{ReadError, ReadResult};
use crate::http::range::{parse_content_range_total, range_header};
use crate::source::{ReadAt, SizeProbe};
use crate::status::ReadOutcome;

/// Upstream source reading a URL with `Range` requests
///
/// Transport concerns (timeouts, TLS roots, proxies) belong to the supplied
/// [`Client`].
#[derive(Debug, Clone)]
pub struct HttpRangeSource {
    url: String,
    client: Client,
}

impl HttpRangeSource {
    /// Create a source for `url` with a default client
    pub fn new(url: impl Into<String>) -> ReadResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(url, client))
    }

    /// Create a source for `url` using `client`
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Get the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_range(&self, first: u64, last: u64) -> ReadResult<Response> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(url = %self.url, first, last, "http range request");
        }
        Ok(self
            .client
            .get(&self.url)
            .header(RANGE, range_header(first, last))
            .send()?)
    }
}

impl ReadAt for HttpRangeSource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Complete(0));
        }
        let last = offset
            .checked_add(buf.len() as u64 - 1)
            .ok_or_else(|| ReadError::InvalidArgument("range end overflows u64".into()))?;

        let mut response = self.request_range(offset, last)?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::OK => {
                // Range ignored: the body is the whole resource.
                let skipped = io::copy(&mut response.by_ref().take(offset), &mut io::sink())
                    .map_err(|source| ReadError::Interrupted {
                        bytes_read: 0,
                        source,
                    })?;
                if skipped < offset {
                    return Ok(ReadOutcome::EndOfData(0));
                }
            }
            StatusCode::RANGE_NOT_SATISFIABLE => return Ok(ReadOutcome::EndOfData(0)),
            status => {
                if tracing::enabled!(tracing::Level::WARN) {
                    tracing::warn!(url = %self.url, status = status.as_u16(), "unexpected range response");
                }
                return Err(ReadError::Status {
                    status: status.as_u16(),
                });
            }
        }

        read_full(&mut response, buf)
    }
}

impl SizeProbe for HttpRangeSource {
    fn size(&self) -> ReadResult<u64> {
        let mut response = self.request_range(0, 0)?;

        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // Drain so the connection can be reused; the body carries nothing we need.
        let _ = io::copy(&mut response, &mut io::sink());

        let value = content_range.ok_or(ReadError::InvalidContentRange)?;
        parse_content_range_total(&value)
    }
}

/// Fill `buf` from `reader` until it is full or the reader ends
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> ReadResult<ReadOutcome> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ReadError::Interrupted {
                    bytes_read: total,
                    source,
                })
            }
        }
    }
    Ok(ReadOutcome::from_counts(total, buf.len()))
}

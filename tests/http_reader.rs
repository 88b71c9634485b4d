//! Integration tests for the HTTP range source and the reader facade.
//!
//! Uses wiremock for HTTP mocking. The blocking client runs on
//! `spawn_blocking` so it never touches the test's async context.

mod common;

use rangecache::device::MemoryStore;
use rangecache::http::HttpRangeSource;
use rangecache::{PagedCacheConfig, RangeReader, ReadAt, ReadError, ReadOutcome, SizeProbe};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use common::pattern;

/// Serves `Range` requests against a fixed body the way a compliant server would
struct RangeResponder {
    body: Vec<u8>,
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let total = self.body.len() as u64;
        let range = request
            .headers
            .get("range")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("bytes="))
            .and_then(|value| value.split_once('-'))
            .and_then(|(first, last)| Some((first.parse::<u64>().ok()?, last.parse::<u64>().ok()?)));

        let Some((first, last)) = range else {
            return ResponseTemplate::new(200).set_body_bytes(self.body.clone());
        };
        if first >= total {
            return ResponseTemplate::new(416)
                .insert_header("content-range", format!("bytes */{total}").as_str());
        }

        let last = last.min(total - 1);
        ResponseTemplate::new(206)
            .insert_header("content-range", format!("bytes {first}-{last}/{total}").as_str())
            .set_body_bytes(self.body[first as usize..=last as usize].to_vec())
    }
}

fn blob_url(server: &MockServer) -> String {
    format!("{}/blob.bin", server.uri())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_partial_content_read() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .and(header("range", "bytes=2-5"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", "bytes 2-5/10")
                .set_body_bytes(b"2345".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let (outcome, buf) = tokio::task::spawn_blocking(move || {
        let source = HttpRangeSource::new(url).expect("failed to create source");
        let mut buf = [0u8; 4];
        let outcome = source.read_at(&mut buf, 2);
        (outcome, buf)
    })
    .await
    .unwrap();

    assert_eq!(outcome.unwrap(), ReadOutcome::Complete(4));
    assert_eq!(&buf, b"2345");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_short_body_is_end_of_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .respond_with(RangeResponder {
            body: b"0123456789".to_vec(),
        })
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let (tail, past_end) = tokio::task::spawn_blocking(move || {
        let source = HttpRangeSource::new(url).expect("failed to create source");
        let mut buf = [0u8; 8];
        let tail = source.read_at(&mut buf, 6).map(|outcome| (outcome, buf[..4].to_vec()));
        let past_end = source.read_at(&mut buf, 10);
        (tail, past_end)
    })
    .await
    .unwrap();

    let (outcome, bytes) = tail.unwrap();
    assert_eq!(outcome, ReadOutcome::EndOfData(4));
    assert_eq!(bytes, b"6789");
    assert_eq!(past_end.unwrap(), ReadOutcome::EndOfData(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_range_ignored_skips_to_offset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"0123456789".to_vec()))
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let (inside, past_end) = tokio::task::spawn_blocking(move || {
        let source = HttpRangeSource::new(url).expect("failed to create source");
        let mut buf = [0u8; 3];
        let inside = source.read_at(&mut buf, 4).map(|outcome| (outcome, buf));
        let past_end = source.read_at(&mut buf, 20);
        (inside, past_end)
    })
    .await
    .unwrap();

    let (outcome, buf) = inside.unwrap();
    assert_eq!(outcome, ReadOutcome::Complete(3));
    assert_eq!(&buf, b"456");
    assert_eq!(past_end.unwrap(), ReadOutcome::EndOfData(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let result = tokio::task::spawn_blocking(move || {
        let source = HttpRangeSource::new(url).expect("failed to create source");
        let mut buf = [0u8; 4];
        source.read_at(&mut buf, 0)
    })
    .await
    .unwrap();

    match result {
        Err(ReadError::Status { status }) => assert_eq!(status, 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_size_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .and(header("range", "bytes=0-0"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", "bytes 0-0/1048576")
                .set_body_bytes(vec![0u8]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let size = tokio::task::spawn_blocking(move || {
        HttpRangeSource::new(url)
            .expect("failed to create source")
            .size()
    })
    .await
    .unwrap();

    assert_eq!(size.unwrap(), 1_048_576);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_size_probe_rejects_unknown_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/unknown.bin"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", "bytes 0-0/*")
                .set_body_bytes(vec![0u8]),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/plain.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"no ranges here".to_vec()))
        .mount(&server)
        .await;

    let base = server.uri();
    let (unknown, plain) = tokio::task::spawn_blocking(move || {
        let unknown = HttpRangeSource::new(format!("{base}/unknown.bin"))
            .expect("failed to create source")
            .size();
        let plain = HttpRangeSource::new(format!("{base}/plain.bin"))
            .expect("failed to create source")
            .size();
        (unknown, plain)
    })
    .await
    .unwrap();

    assert!(matches!(unknown, Err(ReadError::InvalidContentRange)));
    assert!(matches!(plain, Err(ReadError::InvalidContentRange)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cached_reader_fetches_each_page_once() {
    let server = MockServer::start().await;
    let data = pattern(10_000);

    // Size probe, then one fetch covering pages 1..=2 of 4096 bytes.
    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .and(header("range", "bytes=0-0"))
        .respond_with(RangeResponder { body: data.clone() })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .and(header("range", "bytes=4096-9999"))
        .respond_with(RangeResponder { body: data.clone() })
        .expect(1)
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let reads = tokio::task::spawn_blocking(move || {
        let reader = RangeReader::new(url)?
            .with_paged_cache(MemoryStore::new(), PagedCacheConfig::new(4096))?;

        let mut reads = Vec::new();
        for (offset, len) in [(5000u64, 3500usize), (4096, 100), (9000, 2000)] {
            let mut buf = vec![0u8; len];
            let outcome = reader.read_at(&mut buf, offset)?;
            buf.truncate(outcome.bytes());
            reads.push((offset, outcome, buf));
        }
        Ok::<_, ReadError>((reader.size()?, reads))
    })
    .await
    .unwrap();

    let (size, reads) = reads.unwrap();
    assert_eq!(size, 10_000);
    assert_eq!(reads[0].1, ReadOutcome::Complete(3500));
    assert_eq!(reads[0].2, data[5000..8500]);
    assert_eq!(reads[1].1, ReadOutcome::Complete(100));
    assert_eq!(reads[1].2, data[4096..4196]);
    assert_eq!(reads[2].1, ReadOutcome::EndOfData(1000));
    assert_eq!(reads[2].2, data[9000..]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_uncached_reader_goes_upstream_every_time() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob.bin"))
        .and(header("range", "bytes=0-3"))
        .respond_with(RangeResponder {
            body: b"abcdefgh".to_vec(),
        })
        .expect(2)
        .mount(&server)
        .await;

    let url = blob_url(&server);
    let bufs = tokio::task::spawn_blocking(move || {
        let reader = RangeReader::new(url)?;
        let mut first = [0u8; 4];
        let mut second = [0u8; 4];
        reader.read_at(&mut first, 0)?;
        reader.read_at(&mut second, 0)?;
        Ok::<_, ReadError>((first, second))
    })
    .await
    .unwrap();

    let (first, second) = bufs.unwrap();
    assert_eq!(&first, b"abcd");
    assert_eq!(first, second);
}

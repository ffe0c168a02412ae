use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use kline_client::{FailureKind, FetchError, FetcherConfig, KlineFetcher, KlineInterval, KlineQuery};
use tiny_http::{Header, Response, Server};

const SAMPLE_ROW: &str = r#"[0,"100.0","110.0","90.0","105.5","12.3",60000,"...",10,"...","...","0"]"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Serves `replies` in order, one per request, and hands back the request URLs.
fn serve(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").expect("bind mock server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let endpoint = format!("http://{addr}/api/v3/klines");

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let request = server.recv().expect("mock request");
            seen.push(request.url().to_string());
            let json = Header::from_bytes("Content-Type", "application/json").expect("header");
            let response = Response::from_string(body).with_status_code(status).with_header(json);
            let _ = request.respond(response);
        }
        seen
    });

    (endpoint, handle)
}

fn fetcher(endpoint: &str) -> KlineFetcher {
    KlineFetcher::new(FetcherConfig::default().with_endpoint(endpoint)).expect("client")
}

#[test]
fn sample_row_becomes_one_candle() {
    init_logging();
    let (endpoint, server) = serve(vec![(200, format!("[{SAMPLE_ROW}]"))]);

    let query = KlineQuery::new("btcusdt", KlineInterval::OneMinute, 1);
    let table = fetcher(&endpoint).fetch(&query).expect("fetch");

    assert_eq!(table.len(), 1);
    let c = &table.candles()[0];
    assert_eq!(c.ohlc(), Some((100.0, 110.0, 90.0, 105.5)));
    assert_eq!(c.volume, Some(12.3));
    assert_eq!(c.num_trades, Some(10));
    assert_eq!(c.open_time, DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(c.close_time.timestamp_millis(), 60_000);

    let urls = server.join().unwrap();
    let url = &urls[0];
    tracing::info!(%url, "mock saw request");
    assert!(url.starts_with("/api/v3/klines?"), "{url}");
    assert!(url.contains("symbol=BTCUSDT"), "{url}");
    assert!(url.contains("interval=1m"), "{url}");
    assert!(url.contains("limit=1"), "{url}");
}

#[test]
fn rows_keep_count_and_order() {
    init_logging();
    let rows: Vec<String> = (0..5)
        .map(|i| {
            let open = i * 60_000;
            format!(r#"[{open},"1.0","2.0","0.5","1.5","3.0",{},"4.5",{i},"1","1","0"]"#, open + 59_999)
        })
        .collect();
    let (endpoint, server) = serve(vec![(200, format!("[{}]", rows.join(",")))]);

    let table = fetcher(&endpoint)
        .fetch(&KlineQuery::new("ETHUSDT", KlineInterval::OneMinute, 5))
        .unwrap();
    server.join().unwrap();

    assert_eq!(table.len(), 5);
    for (i, c) in table.iter().enumerate() {
        assert_eq!(c.open_time.timestamp_millis(), i as i64 * 60_000);
        assert_eq!(c.num_trades, Some(i as u64));
    }
}

#[test]
fn empty_array_and_object_are_no_data() {
    init_logging();
    let (endpoint, server) = serve(vec![(200, "[]".into()), (200, r#"{"unexpected":true}"#.into()), (200, "null".into())]);
    let f = fetcher(&endpoint);
    let q = KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 200);

    for _ in 0..3 {
        let table = f.fetch(&q).expect("no-data is not an error");
        assert!(table.is_empty());
    }
    server.join().unwrap();
}

#[test]
fn non_numeric_price_is_missing_not_fatal() {
    init_logging();
    let row = r#"[0,"n/a","110.0","90.0","105.5","12.3",60000,"0",10,"0","0","0"]"#;
    let (endpoint, server) = serve(vec![(200, format!("[{row}]"))]);

    let table = fetcher(&endpoint)
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 1))
        .unwrap();
    server.join().unwrap();

    let c = &table.candles()[0];
    assert_eq!(c.open, None);
    assert_eq!(c.high, Some(110.0));
    assert_eq!(c.close, Some(105.5));
    assert_eq!(c.num_trades, Some(10));
    assert!(table.last_close().is_some());
}

#[test]
fn unreadable_trade_count_still_charts() {
    init_logging();
    let rows = [
        r#"[0,"1.0","2.0","0.5","1.5","3.0",59999,"4.5",10,"1","1","0"]"#,
        r#"[60000,"1.5","2.5","1.0","2.0","3.0",119999,"4.5","n/a","1","1","0"]"#,
    ];
    let (endpoint, server) = serve(vec![(200, format!("[{}]", rows.join(",")))]);

    let table = fetcher(&endpoint)
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 2))
        .expect("one bad cell must not fail the fetch");
    server.join().unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.candles()[1].num_trades, None);
    assert_eq!(table.last_close().map(|m| m.value), Some(2.0));
}

#[test]
fn non_2xx_is_a_response_failure() {
    init_logging();
    let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
    let (endpoint, server) = serve(vec![(400, body.into())]);

    let err = fetcher(&endpoint)
        .fetch(&KlineQuery::new("NOPE", KlineInterval::OneMinute, 10))
        .unwrap_err();
    server.join().unwrap();

    assert_eq!(err.kind(), FailureKind::Response);
    assert_eq!(err.status(), Some(400));
    match err {
        FetchError::Http { reason, body: got, .. } => {
            assert_eq!(reason, "Bad Request");
            assert_eq!(got, body);
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[test]
fn invalid_interval_code_surfaces_upstream_rejection() {
    init_logging();
    let (endpoint, server) = serve(vec![(400, r#"{"code":-1120,"msg":"Invalid interval."}"#.into())]);

    let err = fetcher(&endpoint)
        .fetch(&KlineQuery::with_raw_interval("BTCUSDT", "7m", 10))
        .unwrap_err();
    let urls = server.join().unwrap();

    assert!(urls[0].contains("interval=7m"));
    assert_eq!(err.kind(), FailureKind::Response);
}

#[test]
fn server_error_status_is_reported() {
    init_logging();
    let (endpoint, server) = serve(vec![(503, "".into())]);
    let err = fetcher(&endpoint)
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneHour, 10))
        .unwrap_err();
    server.join().unwrap();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().starts_with("503 Service Unavailable"), "{err}");
}

#[test]
fn stalled_upstream_is_a_transport_failure() {
    init_logging();
    // accepts the TCP handshake via the backlog, never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/v3/klines", listener.local_addr().unwrap());

    let cfg = FetcherConfig::default()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(1));
    let f = KlineFetcher::new(cfg).unwrap();

    let started = Instant::now();
    let err = f
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 10))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(err.is_timeout(), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_ne!(err.kind(), FailureKind::Response);
    drop(listener);
}

#[test]
fn refused_connection_is_a_transport_failure() {
    init_logging();
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let err = fetcher(&format!("http://127.0.0.1:{port}/api/v3/klines"))
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 10))
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[test]
fn html_body_is_unexpected() {
    init_logging();
    let (endpoint, server) = serve(vec![(200, "<html>maintenance</html>".into())]);
    let err = fetcher(&endpoint)
        .fetch(&KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 10))
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, FetchError::Decode(_)));
    assert_eq!(err.kind(), FailureKind::Unexpected);
}

#[test]
fn repeated_fetch_is_deterministic() {
    init_logging();
    let payload = format!("[{SAMPLE_ROW},{}]", SAMPLE_ROW.replacen("[0,", "[60000,", 1));
    let (endpoint, server) = serve(vec![(200, payload.clone()), (200, payload)]);

    let f = fetcher(&endpoint);
    let q = KlineQuery::new("BTCUSDT", KlineInterval::OneMinute, 2);
    let a = f.fetch(&q).unwrap();
    let b = f.fetch(&q).unwrap();
    server.join().unwrap();

    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
}

// Integration tests for the Binance REST price feed against a mock server

use grid_paper_trader::{
    BinanceRestClient, ExchangeConfig, PriceFeed, TradingConfig, TradingError,
};
use mockito::{Matcher, Server};

fn exchange_for(url: &str, api_key: &str) -> ExchangeConfig {
    ExchangeConfig {
        api_key: api_key.to_string(),
        base_url: url.to_string(),
        request_timeout_secs: 5,
        ..ExchangeConfig::default()
    }
}

fn trading() -> TradingConfig {
    TradingConfig {
        timeout_retry_secs: 0,
        ..TradingConfig::default()
    }
}

#[tokio::test]
async fn test_current_price_reads_ticker() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(Matcher::UrlEncoded("symbol".into(), "XRPUSDT".into()))
        .match_header("x-mbx-apikey", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"symbol":"XRPUSDT","price":"0.51230000"}"#)
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), "test-key"), &trading()).unwrap();
    let price = client.current_price().await.unwrap();

    assert!((price - 0.5123).abs() < 1e-12);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_key_header_omitted_when_empty() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(Matcher::Any)
        .match_header("x-mbx-apikey", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"symbol":"XRPUSDT","price":"0.50"}"#)
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), ""), &trading()).unwrap();
    assert_eq!(client.current_price().await.unwrap(), 0.5);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_daily_range_reads_24h_ticker() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/ticker/24hr")
        .match_query(Matcher::UrlEncoded("symbol".into(), "XRPUSDT".into()))
        .with_status(200)
        .with_body(
            r#"{"symbol":"XRPUSDT","lastPrice":"0.5100","highPrice":"0.5400","lowPrice":"0.4900"}"#,
        )
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), ""), &trading()).unwrap();
    let range = client.daily_range().await.unwrap();

    assert_eq!(range.low, 0.49);
    assert_eq!(range.high, 0.54);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_status_maps_to_rate_limit_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), ""), &trading()).unwrap();
    let err = client.current_price().await.unwrap_err();

    assert!(matches!(err, TradingError::ApiRateLimit(_)));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_server_error_carries_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/24hr")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), ""), &trading()).unwrap();
    let err = client.daily_range().await.unwrap_err();

    match err {
        TradingError::ApiResponse(msg) => {
            assert!(msg.contains("400"));
            assert!(msg.contains("Invalid symbol."));
        }
        other => panic!("expected ApiResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_response_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let mut client = BinanceRestClient::new(&exchange_for(&server.url(), ""), &trading()).unwrap();
    let err = client.current_price().await.unwrap_err();
    assert!(matches!(err, TradingError::ApiResponse(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_not_retried() {
    // Nothing listens on port 1; a refused connection must surface, not loop
    let mut client = BinanceRestClient::new(&exchange_for("http://127.0.0.1:1", ""), &trading()).unwrap();
    let err = client.current_price().await.unwrap_err();

    assert!(matches!(err, TradingError::ApiConnection(_)));
    assert_eq!(err.category(), "api");
}

use etfscope::AppCommand;
use std::fs;
use tempfile::TempDir;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_profile(mock_server: &MockServer, symbol: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "ETF_PROFILE"))
            .and(query_param("symbol", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    pub async fn mount_daily(mock_server: &MockServer, symbol: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "TIME_SERIES_DAILY"))
            .and(query_param("symbol", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    /// Writes a config pointing at the mock server, with pacing disabled.
    pub fn write_config(dir: &std::path::Path, base_url: &str, universe: &str) -> String {
        let config = format!(
            r#"
providers:
  alpha_vantage:
    base_url: "{base_url}"
    api_key: "TESTKEY"
    request_delay_secs: 0
    timeout_secs: 5
    retries: 0
search:
  top: 5
  fetch_prices: true
{universe}
"#
        );
        let path = dir.join("config.yaml");
        std::fs::write(&path, config).unwrap();
        path.to_string_lossy().into_owned()
    }
}

const SPY_PROFILE: &str = r#"{
    "net_assets": "565000000000",
    "net_expense_ratio": "0.0945",
    "dividend_yield": "0.0121",
    "holdings": [
        {"symbol": "AAPL", "description": "APPLE INC", "weight": "0.0712"},
        {"symbol": "MSFT", "description": "MICROSOFT CORP", "weight": "0.0655"},
        {"symbol": "AMZN", "description": "AMAZON.COM INC", "weight": "0.0380"}
    ]
}"#;

const QQQ_PROFILE: &str = r#"{
    "net_assets": "290000000000",
    "net_expense_ratio": "0.002",
    "dividend_yield": "0.0058",
    "holdings": [
        {"symbol": "AAPL", "description": "APPLE INC", "weight": "0.0890"},
        {"symbol": "NVDA", "description": "NVIDIA CORP", "weight": "0.0810"}
    ]
}"#;

#[test_log::test(tokio::test)]
async fn test_overlap_command_against_mock_provider() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_profile(&mock_server, "SPY", SPY_PROFILE).await;
    test_utils::mount_profile(&mock_server, "QQQ", QQQ_PROFILE).await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");

    let result = etfscope::run_command(
        AppCommand::Overlap {
            fund_a: "spy".to_string(),
            fund_b: "qqq".to_string(),
            limit: 10,
        },
        Some(&config_path),
    )
    .await;

    info!(?result, "Overlap command finished");
    assert!(result.is_ok(), "overlap command failed: {result:?}");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_overlap_command_reports_missing_holdings() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_profile(&mock_server, "SPY", SPY_PROFILE).await;
    test_utils::mount_profile(&mock_server, "GLD", r#"{"net_assets": "60000000000"}"#).await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");

    let err = etfscope::run_command(
        AppCommand::Overlap {
            fund_a: "SPY".to_string(),
            fund_b: "GLD".to_string(),
            limit: 10,
        },
        Some(&config_path),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("No holdings data"));
    assert!(err.to_string().contains("GLD"));
}

#[test_log::test(tokio::test)]
async fn test_overlap_command_reports_rate_limit() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_profile(
        &mock_server,
        "SPY",
        r#"{"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");

    let err = etfscope::run_command(
        AppCommand::Overlap {
            fund_a: "SPY".to_string(),
            fund_b: "QQQ".to_string(),
            limit: 10,
        },
        Some(&config_path),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("Rate limit reached, retry later"));
    // Fails fast: the second fund is never requested
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_holders_command_scans_configured_universe() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_profile(&mock_server, "SPY", SPY_PROFILE).await;
    test_utils::mount_profile(&mock_server, "QQQ", QQQ_PROFILE).await;
    test_utils::mount_daily(
        &mock_server,
        "SPY",
        r#"{"Time Series (Daily)": {
            "2024-06-03": {"1. open": "527.0", "2. high": "529.3", "3. low": "522.6", "4. close": "527.8", "5. volume": "46835702"}
        }}"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    // DIA is not mounted and answers 404, which the scan tolerates
    let universe = r#"
universe:
  - name: "Broad Market"
    funds: ["SPY", "QQQ", "DIA", "spy"]
"#;
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), universe);

    let result = etfscope::run_command(
        AppCommand::Holders {
            symbol: "amzn".to_string(),
            category: None,
            top: None,
            all: false,
            skip: 0,
            no_prices: false,
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_ok(), "holders command failed: {result:?}");

    let requests = mock_server.received_requests().await.unwrap();
    let queries: Vec<String> = requests
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect();
    info!(?queries, "Requests received");

    // Three profile lookups (duplicate SPY dropped) plus one price lookup for the single match
    assert_eq!(requests.len(), 4);
    assert_eq!(
        queries
            .iter()
            .filter(|q| q.contains("function=TIME_SERIES_DAILY"))
            .count(),
        1
    );
}

#[test_log::test(tokio::test)]
async fn test_price_command_requests_full_history() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "TIME_SERIES_DAILY"))
        .and(query_param("symbol", "SPY"))
        .and(query_param("outputsize", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"Time Series (Daily)": {
                "2024-06-03": {"1. open": "529.0", "2. high": "529.3", "3. low": "522.6", "4. close": "527.8", "5. volume": "46835702"},
                "2024-06-04": {"1. open": "526.4", "2. high": "529.1", "3. low": "524.9", "4. close": "528.39", "5. volume": "34632713"}
            }}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");

    let range: etfscope::core::OutputSize = "full".parse().unwrap();
    let result = etfscope::run_command(
        AppCommand::Price {
            symbol: "spy".to_string(),
            range,
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_ok(), "price command failed: {result:?}");
}

#[test_log::test(tokio::test)]
async fn test_universe_command_requires_readable_config() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");

    let err = etfscope::run_command(AppCommand::Universe, missing.to_str())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test_log::test(tokio::test)]
async fn test_universe_command_with_custom_universe() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "universe:\n  - name: \"Bonds\"\n    funds: [\"AGG\", \"BND\"]\n",
    )
    .unwrap();

    let config = etfscope::load_config(config_path.to_str()).unwrap();
    assert_eq!(config.universe().funds(), vec!["AGG", "BND"]);

    let result = etfscope::run_command(AppCommand::Universe, config_path.to_str()).await;
    assert!(result.is_ok());
}

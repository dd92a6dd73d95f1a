//! Stock price tool - latest market price for a ticker symbol
//!
//! Reads `regularMarketPrice` from Yahoo Finance's chart endpoint.

use super::{decode_input, Tool, ToolError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const USER_AGENT: &str = concat!("tickerchat/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct StockPriceInput {
    symbol: String,
}

/// Stock price lookup tool
pub struct StockPriceTool {
    client: Client,
    base_url: String,
}

impl StockPriceTool {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client for quotes");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ToolError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ToolError::Source(format!("Invalid quote URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::Source(format!("Invalid quote URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, ToolError> {
        let url = self.chart_url(symbol)?;
        tracing::debug!(%symbol, %url, "Fetching quote");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Source(format!("Quote request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Source(format!("Failed to read quote response: {e}")))?;

        match parse_chart(&body, symbol) {
            Err(ToolError::Source(_)) if !status.is_success() => {
                Err(ToolError::Source(format!("Quote service returned HTTP {status}")))
            }
            other => other,
        }
    }
}

/// Extract the latest price from a chart response body.
///
/// Yahoo reports unknown symbols as `chart.error` with a description; that
/// description is what the model gets to see.
fn parse_chart(body: &str, symbol: &str) -> Result<f64, ToolError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ToolError::Source(format!("Unexpected quote response: {e}")))?;

    if let Some(err) = resp.chart.error {
        return Err(ToolError::NotFound(format!(
            "{}: {}",
            err.code.as_deref().unwrap_or("Error"),
            err.description.as_deref().unwrap_or("no description"),
        )));
    }

    resp.chart
        .result
        .unwrap_or_default()
        .into_iter()
        .find_map(|r| r.meta.regular_market_price)
        .ok_or_else(|| ToolError::NotFound(format!("No price available for {symbol}")))
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &'static str {
        "get_stock_price"
    }

    fn description(&self) -> String {
        "Get the current stock price for a given symbol".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., AAPL, GOOGL)"
                }
            },
            "required": ["symbol"]
        })
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let input: StockPriceInput = decode_input(input)?;
        let symbol = input.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(ToolError::BadArguments("symbol must not be empty".to_string()));
        }

        let price = self.fetch_price(&symbol).await?;
        Ok(price.to_string())
    }
}

// Yahoo chart API types

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

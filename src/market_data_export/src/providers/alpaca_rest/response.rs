use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::{bar::Bar, bar_series::BarSeries, timeframe::TimeFrame};

/// One bar as returned by the Alpaca API.
///
/// Trade count (`n`) and VWAP (`vw`) are also sent but are not part of the
/// canonical bar, so they are never deserialized.
#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: u64,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    /// Bars keyed by symbol. Alpaca sends `{}` or `null` when nothing matched.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

impl AlpacaBar {
    fn into_bar(self, symbol: &str) -> Bar {
        Bar {
            date: self.timestamp.date_naive(),
            symbol: symbol.to_string(),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

impl AlpacaResponse {
    /// Converts the response into canonical series, one per symbol with rows,
    /// in the order Alpaca listed them.
    pub fn into_series(self, timeframe: &TimeFrame) -> Vec<BarSeries> {
        self.bars
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, bars)| !bars.is_empty())
            .map(|(symbol, alpaca_bars)| {
                let bars = alpaca_bars
                    .into_iter()
                    .map(|ab| ab.into_bar(&symbol))
                    .collect();
                BarSeries::with_bars(symbol, timeframe.clone(), bars)
            })
            .collect()
    }
}

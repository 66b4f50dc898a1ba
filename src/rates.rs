// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! External conversion-rate source, consulted when a currency pair has no
//! stored rates. Failures never hang the caller: a transport error is
//! reported as "no rate" and the ledger turns that into a conversion error.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::Result;

pub trait RateSource {
    /// Multiplicative factor converting an amount in `from` to `to`,
    /// or None when the pair cannot be quoted.
    fn fetch_rate(&self, from: &str, to: &str) -> Result<Option<Decimal>>;
}

/// A source with no quotes. Default for paths that must not reach the network.
pub struct NoRates;

impl RateSource for NoRates {
    fn fetch_rate(&self, _from: &str, _to: &str) -> Result<Option<Decimal>> {
        Ok(None)
    }
}

/// Fixed in-memory quotes, keyed by (from, to).
#[derive(Default)]
pub struct StaticRates {
    rates: HashMap<(String, String), Decimal>,
}

impl StaticRates {
    pub fn with(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

impl RateSource for StaticRates {
    fn fetch_rate(&self, from: &str, to: &str) -> Result<Option<Decimal>> {
        Ok(self
            .rates
            .get(&(from.to_string(), to.to_string()))
            .copied())
    }
}

const UA: &str = concat!(
    "splitbook/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/splitbook)"
);

/// Live quotes from the Frankfurter (ECB) API.
pub struct Frankfurter {
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct Quote {
    rates: HashMap<String, f64>,
}

impl Frankfurter {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .build()?;
        Ok(Self { client })
    }
}

impl RateSource for Frankfurter {
    fn fetch_rate(&self, from: &str, to: &str) -> Result<Option<Decimal>> {
        let url = format!("https://api.frankfurter.dev/latest?from={from}&to={to}");
        let quote: Quote = match self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
        {
            Ok(q) => q,
            // Timeouts and HTTP failures mean "unresolvable", not a crash.
            Err(_) => return Ok(None),
        };
        let Some(rate) = quote.rates.get(to) else {
            return Ok(None);
        };
        Ok(Decimal::try_from(*rate).ok())
    }
}

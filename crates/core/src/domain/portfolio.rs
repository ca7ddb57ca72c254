use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// Anchored at the start only; anything after the digits is ignored.
static HOLDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z]+):\s*([0-9]+)").expect("holding pattern is a valid regex")
});

/// Holdings keyed by uppercase ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Portfolio {
    holdings: BTreeMap<String, u64>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same ticker replace the earlier quantity.
    pub fn insert(&mut self, ticker: &str, quantity: u64) {
        self.holdings.insert(ticker.to_uppercase(), quantity);
    }

    pub fn get(&self, ticker: &str) -> Option<u64> {
        self.holdings.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.holdings.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn total_shares(&self) -> u128 {
        self.holdings.values().map(|&q| u128::from(q)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.holdings.iter().map(|(t, &q)| (t.as_str(), q))
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut out = Portfolio::new();
        for (ticker, quantity) in iter {
            out.insert(ticker, quantity);
        }
        out
    }
}

/// Parses `"TCS: 10, infy:5"` style input. Items that don't look like
/// `<letters>:<digits>` are dropped without error.
pub fn parse_portfolio(input: &str) -> Portfolio {
    let mut out = Portfolio::new();
    for item in input.split(',').map(str::trim) {
        if let Some((ticker, quantity)) = parse_holding(item) {
            out.insert(ticker, quantity);
        }
    }
    out
}

fn parse_holding(item: &str) -> Option<(&str, u64)> {
    let caps = HOLDING_RE.captures(item)?;
    let ticker = caps.get(1)?.as_str();
    // Overflowing quantities are treated like any other malformed item.
    let quantity = caps.get(2)?.as_str().parse::<u64>().ok()?;
    Some((ticker, quantity))
}

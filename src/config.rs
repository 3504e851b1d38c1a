use crate::network::validate_bid_increase;
use chrono::{Datelike, Local};
use std::env;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_START_MONTH: u32 = 5;
const DEFAULT_BID_INCREASE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Zero-based month of the first synthetic forecast week.
    pub start_month: u32,
    pub default_bid_increase: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            start_month: DEFAULT_START_MONTH,
            default_bid_increase: DEFAULT_BID_INCREASE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Invalid values fall back to
    /// defaults. `SIM_START_MONTH=current` uses the local calendar month.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port, |v| v.parse::<u16>().ok());

        let start_month = parse_or(&lookup, "SIM_START_MONTH", defaults.start_month, |v| {
            if v.eq_ignore_ascii_case("current") {
                Some(Local::now().month0())
            } else {
                v.parse::<u32>().ok().filter(|m| *m < 12)
            }
        });

        let default_bid_increase = parse_or(
            &lookup,
            "SIM_DEFAULT_BID_INCREASE",
            defaults.default_bid_increase,
            |v| {
                v.parse::<f64>()
                    .ok()
                    .and_then(|pct| validate_bid_increase(pct).ok())
            },
        );

        Self {
            port,
            start_month,
            default_bid_increase,
        }
    }
}

fn parse_or<T: std::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match parse(raw.trim()) {
            Some(value) => value,
            None => {
                warn!("ignoring invalid {key}={raw:?}, using {default:?}");
                default
            }
        },
    }
}

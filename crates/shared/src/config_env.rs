use std::env;
use std::str::FromStr;

use crate::config::ConfigError;

pub(crate) fn parse_number_env<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => parse_number(key, &raw),
        None => Ok(default),
    }
}

pub(crate) fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::ParseInt {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn parse_list_env(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => parse_csv_list(&raw),
        Err(_) => default.iter().map(|item| (*item).to_string()).collect(),
    }
}

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn parse_csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

use rand::prelude::SliceRandom;
use std::sync::OnceLock;

const DEFAULT_POOL_SIZE: usize = 100;

pub fn bearer_token() -> Option<&'static str> {
    static TOKEN: OnceLock<Option<String>> = OnceLock::new();
    TOKEN
        .get_or_init(|| std::env::var("BENCH_TOKEN").ok().filter(|t| !t.is_empty()))
        .as_deref()
}

/// Id of the user the token belongs to.
pub fn viewer_id() -> String {
    std::env::var("BENCH_VIEWER_ID").unwrap_or_else(|_| "user_001".to_string())
}

/// Comma separated `BENCH_USER_IDS`, or a generated pool.
pub fn get_user_ids() -> &'static [String] {
    static IDS: OnceLock<Vec<String>> = OnceLock::new();
    IDS.get_or_init(|| match std::env::var("BENCH_USER_IDS") {
        Ok(ids) => ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => (1..=DEFAULT_POOL_SIZE)
            .map(|v| format!("user_{v:03}"))
            .collect(),
    })
}

/// A user id other than the viewer's.
pub fn rand_target_id() -> String {
    let viewer = viewer_id();
    let candidates: Vec<&String> = get_user_ids().iter().filter(|id| **id != viewer).collect();
    candidates
        .choose(&mut rand::thread_rng())
        .map(|id| id.to_string())
        .unwrap_or_else(|| "user_002".to_string())
}

pub fn rand_listed_id(ids: &[String]) -> Option<String> {
    ids.choose(&mut rand::thread_rng()).cloned()
}

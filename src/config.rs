//! Process configuration, loaded once from the environment at startup.

use std::env;
use std::sync::LazyLock;

use crate::domain::Coordinates;

pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_env);

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed origin/terminus for every route (C5's depot).
    pub depot: Coordinates,
    /// Average-vehicle-capacity constant driving the clusterer's `k` choice.
    pub capacity_heuristic: usize,
    pub database_url: Option<String>,
    pub bind_addr: String,
}

impl Config {
    fn from_env() -> Self {
        let depot_lat = env_f64("DEPOT_LAT", 47.6062);
        let depot_lon = env_f64("DEPOT_LON", -122.3321);
        let capacity_heuristic = env::var("CAPACITY_HEURISTIC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let database_url = env::var("DATABASE_URL").ok();
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Config {
            depot: Coordinates {
                lat: depot_lat,
                lon: depot_lon,
            },
            capacity_heuristic,
            database_url,
            bind_addr,
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid float, got {raw:?}")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_f64_falls_back_to_default_when_unset() {
        assert_eq!(env_f64("CHILDCARE_ROUTER_NONEXISTENT_KEY", 1.5), 1.5);
    }
}

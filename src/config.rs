use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::solver_factory::SolverType;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024; // 2 MB

/// Service settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub json_limit: usize,
    pub solver: SolverType,
    pub time_limit: Option<Duration>,
    /// CSV roster loaded as the initial stored player pool.
    pub player_data_path: Option<PathBuf>,
    /// Default minutes filter for requests that do not set one.
    pub min_minutes: Option<f64>,
    pub sentry_dsn: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
            solver: SolverType::default(),
            time_limit: None,
            player_data_path: None,
            min_minutes: None,
            sentry_dsn: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = ServerConfig::default();

        let port = parsed("PORT").unwrap_or(defaults.port);
        let json_limit = parsed("JSON_PAYLOAD_LIMIT").unwrap_or(defaults.json_limit);

        let solver = match env::var("SOLVER") {
            Ok(name) => SolverType::parse(&name).unwrap_or_else(|| {
                log::warn!("unknown SOLVER `{}`, falling back to {:?}", name, defaults.solver);
                defaults.solver
            }),
            Err(_) => defaults.solver,
        };

        let time_limit = parsed::<f64>("SOLVE_TIME_LIMIT_SECS")
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64);

        ServerConfig {
            port,
            json_limit,
            solver,
            time_limit,
            player_data_path: non_empty("PLAYER_DATA_PATH").map(PathBuf::from),
            min_minutes: parsed::<f64>("MIN_MINUTES").filter(|m| m.is_finite()),
            sentry_dsn: non_empty("SENTRY_DSN"),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

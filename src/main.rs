use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::io;

use squad_optimizer::config::ServerConfig;
use squad_optimizer::handlers::{json_config, routes, AppState};
use squad_optimizer::load::load_roster;

// ---------- Server bootstrap ----------
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env();

    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let roster = match &config.player_data_path {
        Some(path) => {
            let rows = load_roster(path)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
            info!("loaded {} roster rows from {}", rows.len(), path.display());
            rows
        }
        None => Vec::new(),
    };

    let state = web::Data::new(AppState::from_config(&config, roster));
    let json_limit = config.json_limit;
    info!(
        "Starting server on http://127.0.0.1:{} with {}",
        config.port,
        state.optimizer.solver_name()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(sentry_actix::Sentry::new())
            .app_data(state.clone())
            .app_data(json_config(json_limit))
            .configure(routes)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}

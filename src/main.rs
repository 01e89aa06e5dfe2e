use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod leave;
mod model;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::routes::RateLimiters;
use crate::state::AppState;
use crate::store::{MemoryStore, MySqlStore};
use crate::utils::employee_id_filter;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let state = match &config.database_url {
        Some(url) => AppState::new(Arc::new(MySqlStore::new(init_db(url).await?)), &config),
        None => {
            warn!("DATABASE_URL not set, records live in memory only");
            AppState::new(Arc::new(MemoryStore::new()), &config)
        }
    };
    let state = Data::new(state);

    if let Some(seed) = &config.seed_admin {
        if state
            .auth
            .seed_admin(&seed.name, &seed.email, &seed.password)
            .await?
        {
            info!(email = %seed.email, "Seeded admin account");
        }
    }

    let principals = state.principals.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) =
            employee_id_filter::warmup_employee_id_filter(principals.as_ref(), 500).await
        {
            warn!(error = %e, "Failed to warm up employee id filter");
        }
    });

    let limiters = RateLimiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets match
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}

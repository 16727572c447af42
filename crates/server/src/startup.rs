use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth::ServerState};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, service::AuthConfig, AuthService};
use service::works::{
    repo::seaorm::{SeaOrmVoteRepository, SeaOrmWorkRepository},
    WorksService,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire the SeaORM-backed stores into the services.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> ServerState {
    let works = WorksService::new(
        Arc::new(SeaOrmWorkRepository { db: db.clone() }),
        Arc::new(SeaOrmVoteRepository { db: db.clone() }),
        cfg.ranking.top_n,
    );
    let auth = AuthService::new(
        Arc::new(SeaOrmAuthRepository { db }),
        AuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_hours: cfg.auth.token_ttl_hours },
    );
    ServerState { works: Arc::new(works), auth: Arc::new(auth) }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;

    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = build_state(db, &cfg);
    let app: Router = routes::build_router(build_cors(), state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, top_n = cfg.ranking.top_n, "starting media ranker");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

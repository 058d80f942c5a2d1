//! Plumage - A single-owner personal blog backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plumage::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxLinkRepository, SqlxMemoRepository, SqlxPostRepository, SqlxPostTagRepository,
            SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{LinkService, MemoService, PostService, SiteService, TagService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plumage=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Plumage...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let post_tag_repo = SqlxPostTagRepository::boxed(pool.clone());
    let memo_repo = SqlxMemoRepository::boxed(pool.clone());
    let link_repo = SqlxLinkRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());

    // Wire up services
    let state = AppState {
        post_service: Arc::new(PostService::new(
            post_repo.clone(),
            tag_repo.clone(),
            post_tag_repo.clone(),
        )),
        tag_service: Arc::new(TagService::new(tag_repo.clone(), post_tag_repo)),
        memo_service: Arc::new(MemoService::new(memo_repo.clone())),
        link_service: Arc::new(LinkService::new(link_repo.clone())),
        site_service: Arc::new(SiteService::new(
            user_repo.clone(),
            post_repo,
            tag_repo,
            memo_repo,
            link_repo,
        )),
        user_service: Arc::new(UserService::new(user_repo, config.auth.session_ttl_hours)),
    };

    // Build the router and serve
    let app = api::build_router(state, &config.server.cors_origin);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

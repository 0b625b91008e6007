//! # Foodgram 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 커맨드라인 하위 명령 해석 (`serve` 또는 `load-data`)
//! 4. SQLite 연결 풀 생성과 마이그레이션 실행
//! 5. `serve`: 미디어 디렉토리 생성, 라우터 조립, HTTP 서버 시작
//!    `load-data`: 재료/태그 JSON 파일 적재

// ── 모듈 선언 ──
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use routes::AppState;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 레시피 공유 서비스 백엔드
#[derive(Debug, Parser)]
#[command(name = "foodgram", version)]
struct Cli {
    /// 생략하면 `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// HTTP API 서버를 실행합니다
    Serve,
    /// 재료와 태그 JSON 파일을 DB에 적재합니다
    LoadData {
        /// `[{"name", "measurement_unit"}]` 형식의 재료 파일
        #[arg(long)]
        ingredients: Option<PathBuf>,
        /// `[{"name", "color", "slug"}]` 형식의 태그 파일
        #[arg(long)]
        tags: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 foodgram, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("DATABASE_URL and JWT_SECRET must be set")?;
    let pool = connect(&config.database_url).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::LoadData { ingredients, tags } => load_data(&pool, ingredients, tags).await,
    }
}

/// 연결 풀을 만들고 마이그레이션을 실행합니다.
async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = db::configure_connection(
        SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid DATABASE_URL: {database_url}"))?,
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

async fn serve(config: Config, pool: SqlitePool) -> Result<()> {
    tracing::info!("Starting Foodgram server on {}:{}", config.host, config.port);

    let media_path = Path::new(&config.media_path);
    if !media_path.exists() {
        tokio::fs::create_dir_all(media_path).await?;
        tracing::info!("Created media directory: {}", config.media_path);
    }

    let state = AppState::new(pool, &config);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_data(
    pool: &SqlitePool,
    ingredients: Option<PathBuf>,
    tags: Option<PathBuf>,
) -> Result<()> {
    if ingredients.is_none() && tags.is_none() {
        anyhow::bail!("nothing to load: pass --ingredients and/or --tags");
    }

    if let Some(path) = ingredients {
        services::loader::load_ingredients(pool, &path).await?;
    }
    if let Some(path) = tags {
        services::loader::load_tags(pool, &path).await?;
    }

    tracing::info!("Data loading finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["foodgram"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn load_data_takes_file_paths() {
        let cli = Cli::try_parse_from([
            "foodgram",
            "load-data",
            "--ingredients",
            "data/ingredients.json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::LoadData { ingredients, tags }) => {
                assert_eq!(ingredients, Some(PathBuf::from("data/ingredients.json")));
                assert!(tags.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

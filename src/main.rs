use actix::{Actor, System};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use clap::Parser;
use prometheus::{Encoder, TextEncoder};
use toybox_battle::{
    env::Settings,
    metrics::register_custom_metrics,
    server::{
        end_point,
        registry::{messages::CloseAll, MatchRegistry},
    },
    AppState, LoggerManager,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "toybox battle server",
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,
)]
struct Args {
    /// config/{run_mode}.toml 을 읽습니다. 생략하면 RUN_MODE 환경 변수를 따릅니다.
    #[arg(long = "run-mode")]
    run_mode: Option<String>,

    /// 설정 파일의 server.port 를 덮어씁니다.
    #[arg(long)]
    port: Option<u16>,
}

async fn metrics_route(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(expected_token) = &state.settings.server.metrics_auth_token {
        let provided_token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        if provided_token != Some(expected_token.as_str()) {
            return HttpResponse::Unauthorized().body("Unauthorized: Invalid or missing token");
        }
    }

    let metric_families = state.metrics_registry.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(format!("Metrics encode error: {}", e));
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 1. 환경변수 로드
    dotenv::dotenv().ok();
    let args = Args::parse();

    // 2. 설정 파일 로드
    let mut settings = match &args.run_mode {
        Some(run_mode) => Settings::load(run_mode),
        None => Settings::new(),
    }
    .expect("Failed to load settings");
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    // 3. 로거 초기화
    let _logger_manager = LoggerManager::setup(&settings);
    info!("Logger initialized");

    // 4. Metrics 초기화
    let metrics_registry = prometheus::Registry::new();
    register_custom_metrics(&metrics_registry).expect("Failed to register custom metrics");
    info!("Metrics initialized and registered");

    // 5. 매치 레지스트리 시작
    let registry = MatchRegistry::new(settings.battle.clone(), settings.cleanup.clone()).start();
    info!("MatchRegistry actor started");

    let app_state = AppState {
        settings: settings.clone(),
        registry: registry.clone(),
        metrics_registry,
    };

    // 6. HTTP 서버 시작
    let bind_address = format!("{}:{}", settings.server.bind_address, settings.server.port);
    info!("Starting HTTP server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        let health_route = || async { HttpResponse::Ok().body("OK") };

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(end_point::configure)
            .route("/metrics", web::get().to(metrics_route))
            .route("/health", web::get().to(health_route))
    })
    .bind(&bind_address)?
    .run();

    info!("Battle server is running on {}", bind_address);

    // 7. 종료 신호 대기
    tokio::select! {
        res = &mut server => {
            error!("Server exited unexpectedly");
            return res;
        },

        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received. Initiating graceful shutdown...");
            registry.do_send(CloseAll);
            System::current().stop();
        },
    }

    info!("Waiting for all actors to shutdown...");
    server.await?;
    info!("System has shut down gracefully");

    Ok(())
}

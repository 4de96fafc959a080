use medsupply_intake::config::StoreBackend;
use medsupply_intake::{
    create_pool, ensure_schema, router, AppConfig, AppState, ImportService, InvoicePipeline, RecordStores,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!(
        "Starting server: {}:{}, backend={:?}, storage={:?}",
        config.server.host, config.server.port, config.database.backend, config.storage
    );

    std::fs::create_dir_all(&config.storage.upload_dir)?;
    std::fs::create_dir_all(&config.storage.export_dir)?;
    if !config.storage.template_path.exists() {
        warn!("发票模板不存在: {:?}, 发票上传将失败", config.storage.template_path);
    }

    // 存储后端
    let stores = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            info!("Database pool created");
            ensure_schema(&pool).await?;
            RecordStores::postgres(pool)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory record store, data is lost on restart");
            RecordStores::memory()
        }
    };

    let state = AppState {
        imports: Arc::new(ImportService::new(
            stores,
            &config.import,
            config.storage.upload_dir.clone(),
        )),
        invoices: Arc::new(InvoicePipeline::new(
            config.storage.template_path.clone(),
            config.storage.export_dir.clone(),
            config.import.century_pivot,
        )),
    };
    let app = router(state, &config.storage.export_dir, config.server.max_upload_bytes);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST  /api/medicines/upload           - inventory sheet");
    info!("  PUT   /api/medicines/:id              - update inventory item");
    info!("  POST  /api/vendors/clients/upload     - vendor client sheet");
    info!("  PATCH /api/vendors/clients/:id        - update vendor client");
    info!("  POST  /api/vendors/upload-ledger      - ledger sheet (append-only)");
    info!("  POST  /api/invoices/upload            - single invoice PDF");
    info!("  POST  /api/invoices/upload-multiple   - invoice PDF batch");
    info!("  GET   /exports/:file                  - composited artifacts");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use clap::Parser;
use roads_etl::utils::{logger, validation::Validate};
use roads_etl::{EnvConfig, EtlEngine, PgRoadStore, RoadsPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 先讀 .env，再讓 clap 從環境變數取值
    dotenvy::dotenv().ok();
    let config = EnvConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting roads-etl");
    if config.verbose {
        tracing::debug!(
            "Source: {} -> {}:{}/{}",
            config.source_url,
            config.db_host,
            config.db_port,
            config.db_name
        );
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 Stage timing enabled");
    }

    // 建立資料庫連線與管道
    let store = match PgRoadStore::connect(config.connect_options()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("❌ Could not connect to the database: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };
    let pipeline = RoadsPipeline::new(store, config);

    // 執行 ETL
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ ETL run completed successfully!");
            println!(
                "✅ ETL run completed: {} rows loaded ({} fetched, {} skipped)",
                summary.loaded, summary.extracted, summary.skipped
            );
        }
        Err(e) => {
            tracing::error!("❌ ETL run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

use clap::Parser;
use rank_crawler::core::scheduler::Scheduler;
use rank_crawler::core::trading::market_now;
use rank_crawler::utils::error::CrawlerError;
use rank_crawler::utils::export::{write_stock_summary_csv, write_trade_records_csv};
use rank_crawler::utils::{logger, validation::Validate};
use rank_crawler::{CliConfig, Command, LocalStorage, RankService};
use std::sync::Arc;
use tokio::sync::watch;

fn report_failure(e: &CrawlerError) -> ! {
    tracing::error!(
        "❌ Failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // Low 視為警告，以 0 結束
    std::process::exit(e.severity().exit_code())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting rank-crawler CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_app_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            report_failure(&e)
        }
    };

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    tracing::info!("📂 Cache directory: {}", config.crawler.cache_dir);

    let storage = LocalStorage::new(&config.crawler.cache_dir);
    let service = match RankService::new(config.crawler.clone(), storage) {
        Ok(service) => Arc::new(service.with_monitoring(cli.monitor)),
        Err(e) => report_failure(&e),
    };

    match cli.command() {
        Command::Once => match service.run_update().await {
            Ok(report) => {
                println!(
                    "✅ Saved {} boards / {} rows to {} in {:.2?}",
                    report.boards, report.total_records, report.cache_key, report.elapsed
                );
            }
            Err(e) => report_failure(&e),
        },
        Command::Summary => match service.latest_summary_report().await {
            Ok(Some(report)) => println!("{}", report),
            Ok(None) => println!("📭 暂无缓存的排行榜数据"),
            Err(e) => report_failure(&e),
        },
        Command::Trades {
            days_back,
            max_days,
            use_cache,
            csv,
        } => {
            let records = match service.tc_list(days_back, max_days, use_cache).await {
                Ok(records) => records,
                Err(e) => report_failure(&e),
            };
            for record in &records {
                println!(
                    "{} {} {} {}({}) {} @ {} [{}]",
                    record.date,
                    record.portfolio_name,
                    record.action.label(),
                    record.stock_name,
                    record.stock_code,
                    record.position_ratio,
                    record.price,
                    record.portfolio_id
                );
            }
            println!("共 {} 条调仓记录", records.len());
            if let Some(path) = csv {
                if let Err(e) = write_trade_records_csv(&path, &records) {
                    report_failure(&e);
                }
                println!("📁 Exported to {}", path.display());
            }
        }
        Command::Stocks {
            days_back,
            max_days,
            csv,
        } => {
            let summary = match service.stock_summary(days_back, max_days).await {
                Ok(summary) => summary,
                Err(e) => report_failure(&e),
            };
            for stock in &summary {
                println!(
                    "{} {}  买入 {}  卖出 {}",
                    stock.stock_code, stock.stock_name, stock.buy_count, stock.sell_count
                );
            }
            if let Some(path) = csv {
                if let Err(e) = write_stock_summary_csv(&path, &summary) {
                    report_failure(&e);
                }
                println!("📁 Exported to {}", path.display());
            }
        }
        Command::Run => {
            match service.run_update().await {
                Ok(report) => tracing::info!(
                    "✅ Initial update: {} rows at {}",
                    report.total_records,
                    market_now().format("%H:%M:%S")
                ),
                Err(e) => {
                    tracing::error!("❌ Initial update failed, not starting the scheduler");
                    report_failure(&e)
                }
            }

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let scheduler = Scheduler::new(Arc::clone(&service), config.schedule.clone());
            let task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

            tokio::signal::ctrl_c().await?;
            tracing::info!("🛑 Ctrl+C received, stopping scheduler");
            let _ = shutdown_tx.send(true);
            task.await?;
        }
    }

    Ok(())
}

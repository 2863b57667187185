use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod session;
mod utils;

use config::{Config, LayeredIntervalSource};
use services::{
    create_command_host,
    create_host_bridge,
    create_notifier,
    create_status_indicator,
    CommandDispatcher,
    ControllerDeps,
    FileWindowStore,
    MemoryStorage,
    ProceederLoop,
    StateController,
    WindowStore,
};
use session::WindowSession;

#[derive(Parser, Debug)]
#[command(name = "auto-proceed")]
#[command(about = "Периодически подтверждает шаги AI-агента в редакторе, пока фокус в редакторе или терминале")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "auto-proceed.toml")]
    config: String,

    /// Режим сухого запуска (без реальных команд хоста)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает logging.level)
    #[arg(long)]
    log_level: Option<String>,

    /// Идентификатор окна (перекрывает window.id)
    #[arg(short, long)]
    window: Option<String>,

    /// Каталог состояния окон (перекрывает window.state_dir)
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if let Some(window) = &args.window {
        config.window.id = window.clone();
    }
    if let Some(state_dir) = &args.state_dir {
        config.window.state_dir = state_dir.clone();
    }
    let config = Arc::new(config);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск Auto Proceed v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - команды хоста не выполняются");
    }

    // Инициализация компонентов
    let host = create_command_host(config.clone(), args.dry_run)?;
    let store: Arc<dyn WindowStore> = if args.dry_run {
        Arc::new(MemoryStorage::new().for_window(&config.window.id))
    } else {
        Arc::new(FileWindowStore::new(&config.window.state_dir, &config.window.id)?)
    };

    let dispatcher = CommandDispatcher::new(host.clone(), config.proceed.commands.clone());
    let controller = StateController::new(
        ProceederLoop::new(dispatcher),
        ControllerDeps {
            store,
            interval: Arc::new(LayeredIntervalSource::new(&args.config)),
            status: create_status_indicator(&config),
            notifier: create_notifier(&config),
            host,
            type_command: config.proceed.type_command.clone(),
        },
    );
    let session = WindowSession::new(config.window.id.clone(), controller);

    info!("Все компоненты инициализированы");

    // Мост хоста пишет в единый упорядоченный канал событий
    let (events_tx, events_rx) = mpsc::channel(64);
    let bridge = create_host_bridge(args.dry_run);
    let bridge_handle = tokio::spawn(async move {
        if let Err(e) = bridge.run(events_tx).await {
            error!("Ошибка в HostBridge: {}", e);
        }
    });

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        }
    };

    session.run(events_rx, shutdown).await;

    // Чтение stdin может висеть бесконечно, поэтому мост прерываем
    bridge_handle.abort();
    let _ = bridge_handle.await;

    info!("Auto Proceed завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    // stdout и stdin остаются за протоколом хоста
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

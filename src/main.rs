use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::Config;
use services::{
    create_notifier,
    create_pointer_sampler,
    ActionDispatcher,
    ConfigProvider,
    GestureDetector,
    GestureMonitor,
    GestureThresholds,
    ProcessLauncher,
    VirtualDevice,
};

const VIRTUAL_DEVICE_NAME: &str = "SwipeDown Virtual Keyboard";

#[derive(Parser, Debug)]
#[command(name = "swipedown")]
#[command(about = "Запуск программы или комбинации клавиш свайпом вниз от верхнего края экрана")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "swipedown.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(log_level, &config.logging.format)?;

    info!("Запуск SwipeDown v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else if let Err(e) = utils::permissions::check_permissions() {
        error!("{}", e);
        for command in utils::permissions::get_setup_commands() {
            error!("   {}", command);
        }
        return Err(e.into());
    }

    // Инициализация компонентов
    let virtual_device = match VirtualDevice::new(VIRTUAL_DEVICE_NAME, args.dry_run) {
        Ok(device) => Arc::new(device),
        Err(e) => {
            warn!("Виртуальная клавиатура недоступна: {}. Комбинации клавиш отключены", e);
            Arc::new(VirtualDevice::unavailable(VIRTUAL_DEVICE_NAME))
        }
    };
    let launcher = Arc::new(ProcessLauncher::new(args.dry_run));
    let dispatcher = ActionDispatcher::new(virtual_device, launcher);

    let config_provider = Arc::new(ConfigProvider::from_config(&args.config, &config)?);
    if config.action.is_none() {
        warn!("Секция [action] не задана - жесты будут распознаваться без действия");
    }

    // Сохранённый файл подхватывается сразу, SIGHUP остаётся ручным способом
    let _config_watcher = match config_provider.watch() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Слежение за {} недоступно, перечитывание только по SIGHUP: {}", args.config, e);
            None
        }
    };

    let notifier = create_notifier(&config.notifications, args.dry_run);
    let sampler = create_pointer_sampler(&config, args.dry_run)?;
    let detector = GestureDetector::new(GestureThresholds::from(&config.gesture));

    let monitor = GestureMonitor::new(
        sampler,
        detector,
        dispatcher,
        Arc::clone(&config_provider),
        notifier,
        config.poll_interval(),
    );

    info!("Все компоненты инициализированы");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_handle = tokio::spawn(async move {
        if let Err(e) = monitor.run(shutdown_rx).await {
            error!("Ошибка в GestureMonitor: {}", e);
        }
    });

    info!("Отслеживание жестов запущено");

    // Ctrl+C - завершение, SIGHUP - перечитать конфигурацию действия
    let mut hangup = unix_signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
            _ = hangup.recv() => {
                info!("Получен SIGHUP, перечитываем {}", args.config);
                if let Err(e) = config_provider.reload() {
                    error!("Не удалось перечитать конфигурацию, оставляем прежнюю: {}", e);
                }
            }
        }
    }

    info!("Завершение работы...");

    // Цикл останавливается между тиками
    let _ = shutdown_tx.send(true);

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, monitor_handle).await {
        Ok(_) => info!("GestureMonitor завершил работу корректно"),
        Err(_) => warn!("Таймаут при завершении GestureMonitor"),
    }

    info!("SwipeDown завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "full" => registry.with(tracing_subscriber::fmt::layer()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}

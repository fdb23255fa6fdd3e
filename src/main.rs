use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
pub mod mappings;
mod services;
mod utils;

use config::Config;
use events::CaptureRegion;
use services::frame_source::{create_capture_backend, CaptureBackend};
use services::{Backends, Orchestrator};

#[derive(Parser, Debug)]
#[command(name = "chroma-trigger")]
#[command(about = "Нажимает клавишу, когда в центре экрана появляется заданный цвет, пока удерживается триггер")]
struct Args {
    /// Путь к файлу конфигурации (.toml или .json)
    #[arg(short, long, default_value = "chroma.toml")]
    config: String,

    /// Режим сухого запуска (без захвата экрана и синтетического ввода)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Проверить конфигурацию и выйти
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Конфигурация нужна раньше логирования: из неё берётся уровень и формат
    let config = Config::load(&args.config)?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск Chroma Trigger v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);
    config.warn_legacy_keybind(&args.config);

    if args.check_config {
        return check_config(&config, args.dry_run);
    }

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else if let Err(e) = utils::permissions::check_permissions() {
        error!("Недостаточно прав: {}", e);
        for cmd in utils::permissions::setup_commands() {
            info!("  {}", cmd);
        }
        return Err(e.into());
    }

    let backends = Backends::create(&config, args.dry_run)?;
    let orchestrator = Orchestrator::start(Arc::new(config), backends)?;

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    let stats = orchestrator.capture_stats();
    info!(
        "Кадров: {}, ошибок захвата: {}, переинициализаций: {}",
        stats.frames, stats.failures, stats.reinit_attempts
    );

    orchestrator.stop().await;

    info!("Chroma Trigger завершил работу");
    Ok(())
}

fn check_config(config: &Config, dry_run: bool) -> Result<()> {
    println!("Триггер: {}", config.trigger_key()?);
    println!("Выходная клавиша: {}", config.output_key()?);
    println!(
        "Частота кадров: {} fps, пауза между выстрелами: {:?}",
        config.fps,
        config.cooldown()
    );
    println!(
        "HSV диапазон: {:?} - {:?}",
        config.hsv_range[0], config.hsv_range[1]
    );

    // Область зависит от экрана, поэтому выводится только если его размер известен
    match create_capture_backend(dry_run).and_then(|backend: Box<dyn CaptureBackend>| backend.screen_size()) {
        Ok((width, height)) => {
            let region = CaptureRegion::centered(config.fov, width, height)?;
            println!("Область захвата на экране {}x{}: {}", width, height, region);
        }
        Err(e) => warn!("Размер экрана неизвестен, область захвата не вычислена: {}", e),
    }

    println!("Конфигурация корректна");
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

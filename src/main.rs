use mock_signalr::config::Config;
use mock_signalr::demo;
use mock_signalr::events::Command;
use mock_signalr::feeds::console;
use mock_signalr::feeds::script::{demo_script, ScriptFeed};
use mock_signalr::{CountdownScheduler, DismissalTimer, MockRealtime, SystemClock};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "MOCK_SIGNALR_CONFIG";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let cfg = Config::load_or_default(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Loaded config from {}: {:?}", path, cfg);

    // Everything shares one page, so one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();
    local.block_on(&runtime, run(cfg))
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let doc = demo::build_page(cfg.demo.page, now)?;

    let engine = MockRealtime::new(doc, SystemClock, &cfg).into_shared();
    engine.borrow_mut().init();

    let mut scheduler = CountdownScheduler::new(cfg.scheduler.tick_interval());
    scheduler.start(engine.clone());

    // Messages expire on their own timer, stopping countdowns leaves it armed
    let mut dismissal = DismissalTimer::new(cfg.notifications.sweep_interval());
    dismissal.start(engine.clone());

    // Create the command channel
    let (tx, mut rx) = mpsc::channel::<Command>(100);

    // Start feeds
    if cfg.demo.script {
        ScriptFeed::new(demo_script(), cfg.demo.step_interval())
            .shutdown_when_done(!cfg.demo.console)
            .spawn(tx.clone());
    }
    if cfg.demo.console {
        console::spawn(tx.clone());
    }

    let ctrl_c_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(Command::Shutdown).await;
        }
    });
    drop(tx);

    // Main dispatch loop
    info!("Dispatching commands... (Ctrl+C to quit)");
    while let Some(command) = rx.recv().await {
        match command {
            Command::StartCountdowns => {
                if !scheduler.start(engine.clone()) {
                    warn!("Countdowns already running");
                }
            }
            Command::StopCountdowns => {
                scheduler.stop();
            }
            Command::Shutdown => {
                info!("Shutting down...");
                break;
            }
            other => engine.borrow_mut().dispatch(other),
        }
    }

    scheduler.stop();
    dismissal.stop();
    let engine = engine.borrow();
    let doc = engine.document();
    println!("{}", doc.to_html(doc.root()));
    Ok(())
}

//! Wiring & DI. Entry point: bootstrap adapters, inject into the controller, run UI.
//! No business logic here.

use dotenv::dotenv;
use revibe::adapters::ai::{GeminiAdapter, MockAiAdapter};
use revibe::adapters::persistence::{JsonFileStore, LocalStore};
use revibe::adapters::ui::tui::TuiInputPort;
use revibe::ports::{AdvisorPort, AnalysisPort, InputPort, KeyValueStore};
use revibe::shared::config::AppConfig;
use revibe::usecases::{AppController, ChatSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    // Logs go to stderr so they never interleave with prompts on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_default();

    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    let data_dir_abs = data_dir.canonicalize().unwrap_or_else(|_| data_dir.clone());
    info!(path = %data_dir_abs.display(), "snapshot directory");
    let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&data_dir));
    let store = LocalStore::new(backend);

    let (analyzer, advisor) = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "AI analysis enabled with Gemini adapter"
        );
        let gemini = Arc::new(GeminiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
        ));
        (
            Arc::clone(&gemini) as Arc<dyn AnalysisPort>,
            gemini as Arc<dyn AdvisorPort>,
        )
    } else {
        warn!("no Gemini API key (REVIBE_AI_API_KEY / GEMINI_API_KEY / API_KEY), using mock AI adapter");
        let mock = Arc::new(MockAiAdapter::with_delay(cfg.mock_delay_ms_or_default()));
        (
            Arc::clone(&mock) as Arc<dyn AnalysisPort>,
            mock as Arc<dyn AdvisorPort>,
        )
    };

    let controller = Arc::new(AppController::load(store, analyzer).await);
    let chat = ChatSession::new(advisor);

    revibe::adapters::ui::init_ui();

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(controller, chat));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

use editor_engine::{LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, EditorConfig};
use super::editor::EditorScene;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Scene Editor Startup ===");

    let editor_config = EditorConfig::load_from_env()?;
    info!(
        scene_width = editor_config.scene_width,
        scene_height = editor_config.scene_height,
        viewport_width = editor_config.viewport_width,
        viewport_height = editor_config.viewport_height,
        tick_rate = editor_config.tick_rate,
        movement_step = editor_config.movement_step,
        "editor_config_loaded"
    );

    Ok(AppWiring {
        config: editor_config.loop_config(),
        scene: Box::new(EditorScene::new(editor_config)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

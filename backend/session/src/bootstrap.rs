//! Page-load startup: configuration, logging, then the session itself.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ragchat_config::{load_and_prepare, RagChatConfig};
use ragchat_core::EngineLoader;
use ragchat_memory::Catalog;
use tracing::info;

use crate::controller::SessionController;
use crate::session_state::SessionSettings;

/// Load and validate the config at `config_path`, install the logger it
/// describes and create the session controller.
pub async fn start_session(
    config_path: &Path,
    loader: Arc<dyn EngineLoader>,
    catalog: Arc<Catalog>,
) -> Result<SessionController> {
    let config = load_and_prepare(config_path).await?;
    Ok(start_with_config(&config, loader, catalog))
}

/// Same as [`start_session`] for a config that is already prepared.
pub fn start_with_config(
    config: &RagChatConfig,
    loader: Arc<dyn EngineLoader>,
    catalog: Arc<Catalog>,
) -> SessionController {
    logging::init_logger(config.log_dir().map(Path::new), config.log_level());

    let settings = SessionSettings::from_config(config);
    let controller = SessionController::new(settings, loader, catalog);
    info!(
        session_id = %controller.session_id(),
        embedding_model = %controller.settings().embedding_model,
        "Session started"
    );
    controller
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ragchat_core::{Engine, EngineState, ProgressReporter};

    use super::*;

    struct NoEngine;

    #[async_trait]
    impl EngineLoader for NoEngine {
        async fn load(
            &self,
            _model_ids: &[String],
            _progress: ProgressReporter,
        ) -> anyhow::Result<Arc<dyn Engine>> {
            anyhow::bail!("no GPU adapter")
        }
    }

    #[tokio::test]
    async fn test_missing_config_starts_with_defaults() {
        let path = std::env::temp_dir().join("ragchat-session-no-such-config.yaml");
        let controller = start_session(&path, Arc::new(NoEngine), Arc::new(Catalog::default()))
            .await
            .unwrap();

        assert_eq!(controller.settings().history_window, 4);
        assert_eq!(controller.settings().top_k, 4);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.engine_state, EngineState::Unloaded);
        assert!(snapshot.ui.download_enabled);
    }

    #[tokio::test]
    async fn test_config_overrides_reach_settings() {
        let config = ragchat_config::prepare(
            ragchat_config::from_yaml_str("session:\n  historyWindow: 6\n  topK: 2\n").unwrap(),
        )
        .unwrap();
        let controller =
            start_with_config(&config, Arc::new(NoEngine), Arc::new(Catalog::default()));

        assert_eq!(controller.settings().history_window, 6);
        assert_eq!(controller.settings().top_k, 2);
    }
}

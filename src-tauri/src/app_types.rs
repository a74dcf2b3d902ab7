use crate::{app_config::AppConfig, render_env::EngineSettings, render_mode::RenderDecision};

/// Startup results shared with window and page-load callbacks.
#[derive(Debug)]
pub(crate) struct ShellState {
    pub(crate) config: AppConfig,
    pub(crate) render_decision: RenderDecision,
    pub(crate) engine: EngineSettings,
    pub(crate) page_load_scripts: Vec<String>,
}

impl ShellState {
    pub(crate) fn new(
        config: AppConfig,
        render_decision: RenderDecision,
        engine: EngineSettings,
        page_load_scripts: Vec<String>,
    ) -> Self {
        Self {
            config,
            render_decision,
            engine,
            page_load_scripts,
        }
    }
}

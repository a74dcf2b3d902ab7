use tauri::{AppHandle, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::{
    app_config::{AppConfig, ContentTarget},
    render_env::EngineSettings,
    window_actions, MAIN_WINDOW_LABEL,
};

fn webview_url(target: ContentTarget) -> WebviewUrl {
    match target {
        ContentTarget::External(url) => WebviewUrl::External(url),
        ContentTarget::Bundled(path) => WebviewUrl::App(path),
    }
}

pub(crate) fn create_main_window<F>(
    app_handle: &AppHandle,
    config: &AppConfig,
    engine: &EngineSettings,
    log: F,
) -> Result<WebviewWindow, String>
where
    F: Fn(&str),
{
    let target = config.webview.content_target()?;
    log(&format!("main window target: {target:?}"));

    let mut builder = WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, webview_url(target))
        .title(&config.window.title)
        .inner_size(config.window.width, config.window.height)
        .resizable(config.window.resizable)
        .devtools(config.debug)
        .visible(false);

    #[cfg(not(target_os = "macos"))]
    {
        builder = builder.transparent(config.window.transparent);
    }
    #[cfg(target_os = "macos")]
    if config.window.transparent {
        log("transparent windows are not supported on macOS; ignoring window.transparent");
    }

    #[cfg(target_os = "windows")]
    {
        builder = builder.additional_browser_args(&engine.browser_args);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = engine;

    if let Some(user_agent) = config
        .webview
        .user_agent
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        builder = builder.user_agent(user_agent);
    }

    let window = builder
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;

    if config.window.full_screen {
        if let Err(error) = window_actions::fit_to_current_monitor(&window) {
            log(&format!("{error}; keeping default window size"));
        }
    }

    window_actions::show_window(&window, &log);
    Ok(window)
}

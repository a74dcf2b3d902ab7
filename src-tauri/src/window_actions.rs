use tauri::{AppHandle, Manager, WebviewWindow};

use crate::MAIN_WINDOW_LABEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplicationState {
    Active,
    Inactive,
}

impl ApplicationState {
    pub(crate) fn from_focus(focused: bool) -> Self {
        if focused {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

pub(crate) fn show_window<F>(window: &WebviewWindow, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

pub(crate) fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    show_window(&window, log);
}

/// Sizes and positions the window to cover the monitor it is on.
pub(crate) fn fit_to_current_monitor(window: &WebviewWindow) -> Result<(), String> {
    let monitor = window
        .current_monitor()
        .map_err(|error| format!("Failed to read current monitor: {error}"))?
        .or(window
            .primary_monitor()
            .map_err(|error| format!("Failed to read primary monitor: {error}"))?)
        .ok_or_else(|| "No monitor available for full-screen sizing.".to_string())?;

    window
        .set_position(*monitor.position())
        .map_err(|error| format!("Failed to move main window: {error}"))?;
    window
        .set_size(*monitor.size())
        .map_err(|error| format!("Failed to resize main window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::ApplicationState;

    #[test]
    fn application_state_follows_focus() {
        assert_eq!(ApplicationState::from_focus(true), ApplicationState::Active);
        assert_eq!(ApplicationState::from_focus(false), ApplicationState::Inactive);
        assert_eq!(ApplicationState::Inactive.as_str(), "inactive");
    }
}

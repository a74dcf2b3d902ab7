#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_config;
mod app_constants;
mod app_runtime;
mod app_types;
mod environment_probe;
mod injected_assets;
mod ipc_scheme;
mod launch_args;
mod logging;
mod main_window;
mod render_env;
mod render_mode;
mod runtime_paths;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::ShellState;
pub(crate) use logging::{append_desktop_log, append_ipc_log, append_startup_log};

fn main() {
    app_runtime::run();
}

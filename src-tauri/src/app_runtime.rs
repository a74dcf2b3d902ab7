use std::env;

use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, WindowEvent};

use crate::{
    app_config::{self, AppConfig},
    append_desktop_log, append_startup_log,
    environment_probe::SystemProbe,
    injected_assets, ipc_scheme,
    launch_args::LaunchArgs,
    main_window, render_env,
    render_mode::{self, RenderConfig},
    runtime_paths,
    window_actions::{self, ApplicationState},
    ShellState, BROWSER_ARGS_ENV, CONFIG_OVERRIDES_ENV, DESKTOP_LOG_FILE, IPC_SCHEME,
    MAIN_WINDOW_LABEL, REMOTE_DEBUG_PORT,
};

fn load_startup_config(launch_args: &LaunchArgs) -> AppConfig {
    let config_path = launch_args
        .config_path
        .clone()
        .or_else(runtime_paths::default_config_path);
    let overrides =
        app_config::parse_config_overrides(env::var(CONFIG_OVERRIDES_ENV).ok().as_deref())
            .unwrap_or_else(|error| {
                append_startup_log(&format!("{error}; ignoring {CONFIG_OVERRIDES_ENV}"));
                None
            });

    let mut config = match app_config::load_config(config_path.as_deref(), overrides) {
        Ok(config) => {
            if let Some(path) = &config_path {
                append_startup_log(&format!("config path: {}", path.display()));
            }
            config
        }
        Err(error) => {
            append_startup_log(&format!("{error}; using default configuration"));
            AppConfig::default()
        }
    };
    config.apply_launch_args(launch_args);
    config.apply_env_overrides(|key| env::var(key).ok());
    config
}

fn show_startup_error(app_handle: &AppHandle, message: &str) {
    eprintln!("WebShell startup failed: {message}");
    append_startup_log(&format!("startup failed: {message}"));
    app_handle.exit(1);
}

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        crate::logging::resolve_desktop_log_path(
            runtime_paths::default_root_dir(),
            DESKTOP_LOG_FILE,
        )
        .display()
    ));

    let launch_args = LaunchArgs::from_env();
    let config = load_startup_config(&launch_args);

    if config.debug {
        append_startup_log("debug mode on");
    } else {
        append_startup_log("production mode on, use --dev for debugging");
    }

    let render_decision = render_mode::select_render_mode(
        &RenderConfig {
            disable_gpu: config.disable_gpu,
        },
        &SystemProbe::from_env(),
    );
    append_startup_log(&format!(
        "rendering mode: {} ({})",
        if render_decision.use_software_rendering {
            "software"
        } else {
            "hardware"
        },
        render_decision.reason.describe()
    ));

    let extra_browser_args =
        render_env::parse_extra_browser_args(env::var(BROWSER_ARGS_ENV).ok().as_deref())
            .unwrap_or_else(|error| {
                append_startup_log(&format!("{error}; ignoring {BROWSER_ARGS_ENV}"));
                Vec::new()
            });
    let remote_debug_port = config.remote_debug.then_some(REMOTE_DEBUG_PORT);
    if let Some(port) = remote_debug_port {
        append_startup_log(&format!("remote debugging enabled on port {port}"));
    }
    let engine = render_env::plan_engine_settings(
        &render_decision,
        remote_debug_port,
        &extra_browser_args,
    );
    let applied = render_env::apply_engine_env(&engine);
    if !applied.is_empty() {
        append_startup_log(&format!("web engine environment: {}", applied.join(", ")));
    }
    if config.debug {
        append_startup_log(&format!("WebView2 browser args: {}", engine.browser_args));
    }

    let page_load_scripts = injected_assets::page_load_scripts(&config);
    if config.webview.add_css.is_some() {
        append_startup_log("custom CSS detected");
    }
    if config.webview.run_javascript.is_some() {
        append_startup_log("custom JavaScript detected");
    }
    let uses_ipc_scheme = config.webview.uses_ipc_scheme();

    let mut builder = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app_handle, _argv, _cwd| {
            append_desktop_log("second instance launched, focusing main window");
            window_actions::show_main_window(app_handle, append_desktop_log);
        }))
        .manage(ShellState::new(
            config,
            render_decision,
            engine,
            page_load_scripts,
        ))
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::Focused(focused) = event {
                append_desktop_log(&format!(
                    "application {}",
                    ApplicationState::from_focus(*focused).as_str()
                ));
            }
        })
        .on_page_load(|webview, payload| {
            if webview.label() != MAIN_WINDOW_LABEL {
                return;
            }
            if let PageLoadEvent::Finished = payload.event() {
                append_desktop_log(&format!("page-load finished: {}", payload.url()));
                let state = webview.app_handle().state::<ShellState>();
                for script in &state.page_load_scripts {
                    if let Err(error) = webview.eval(script.as_str()) {
                        append_desktop_log(&format!("failed to inject page script: {error}"));
                    }
                }
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            let state = app_handle.state::<ShellState>();
            match main_window::create_main_window(
                &app_handle,
                &state.config,
                &state.engine,
                append_startup_log,
            ) {
                Ok(_) => append_startup_log(&format!(
                    "main window ready (software rendering: {})",
                    state.render_decision.use_software_rendering
                )),
                Err(error) => show_startup_error(&app_handle, &error),
            }
            Ok(())
        });

    if uses_ipc_scheme {
        append_startup_log(&format!("registering {IPC_SCHEME}: scheme"));
        builder = builder.register_uri_scheme_protocol(IPC_SCHEME, |ctx, request| {
            ipc_scheme::handle_ipc_request(ctx.app_handle(), &request)
        });
    }

    builder
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|_app_handle, event| {
            if let RunEvent::Exit = event {
                append_desktop_log("desktop process exiting");
            }
        });
}

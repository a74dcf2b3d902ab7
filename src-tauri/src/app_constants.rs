pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const DEFAULT_WINDOW_TITLE: &str = "WebShell";
pub(crate) const DEFAULT_WINDOW_WIDTH: f64 = 1024.0;
pub(crate) const DEFAULT_WINDOW_HEIGHT: f64 = 768.0;
pub(crate) const DEFAULT_OFFLINE_PAGE: &str = "index.html";

pub(crate) const ROOT_DIR_ENV: &str = "WEBSHELL_ROOT";
pub(crate) const DEFAULT_ROOT_DIR_NAME: &str = ".webshell";
pub(crate) const CONFIG_FILE_NAME: &str = "config.json";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";

pub(crate) const CONFIG_OVERRIDES_ENV: &str = "WEBSHELL_CONFIG_OVERRIDES";
pub(crate) const URL_OVERRIDE_ENV: &str = "WEBSHELL_URL";
pub(crate) const DISABLE_GPU_ENV: &str = "WEBSHELL_DISABLE_GPU";
pub(crate) const BROWSER_ARGS_ENV: &str = "WEBSHELL_BROWSER_ARGS";
pub(crate) const PROBE_TIMEOUT_ENV: &str = "WEBSHELL_PROBE_TIMEOUT_MS";

pub(crate) const DEFAULT_PROBE_TIMEOUT_MS: u64 = 500;
pub(crate) const REMOTE_DEBUG_PORT: u16 = 9000;

pub(crate) const IPC_SCHEME: &str = "shellipc";
pub(crate) const IPC_MESSAGE_EVENT: &str = "ipc-message";

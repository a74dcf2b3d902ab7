use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    launch_args::LaunchArgs, DEFAULT_OFFLINE_PAGE, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_TITLE,
    DEFAULT_WINDOW_WIDTH, DISABLE_GPU_ENV, URL_OVERRIDE_ENV,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AppConfig {
    pub(crate) debug: bool,
    #[serde(alias = "remote-debug")]
    pub(crate) remote_debug: bool,
    #[serde(alias = "disableGPU")]
    pub(crate) disable_gpu: bool,
    pub(crate) window: WindowConfig,
    pub(crate) webview: WebviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) full_screen: bool,
    pub(crate) transparent: bool,
    pub(crate) resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_WINDOW_TITLE.to_string(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            full_screen: false,
            transparent: false,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WebviewConfig {
    pub(crate) url: Option<String>,
    pub(crate) online: bool,
    #[serde(alias = "IPC")]
    pub(crate) ipc: bool,
    #[serde(alias = "addCSS")]
    pub(crate) add_css: Option<String>,
    #[serde(alias = "runJavaScript")]
    pub(crate) run_javascript: Option<String>,
    pub(crate) user_agent: Option<String>,
}

impl Default for WebviewConfig {
    fn default() -> Self {
        Self {
            url: None,
            online: false,
            ipc: true,
            add_css: None,
            run_javascript: None,
            user_agent: None,
        }
    }
}

/// Where the main window's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContentTarget {
    External(Url),
    Bundled(PathBuf),
}

impl WebviewConfig {
    pub(crate) fn content_target(&self) -> Result<ContentTarget, String> {
        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if !self.online {
            let page = raw
                .unwrap_or(DEFAULT_OFFLINE_PAGE)
                .trim_start_matches('/');
            return Ok(ContentTarget::Bundled(PathBuf::from(page)));
        }

        let raw = raw
            .ok_or_else(|| "webview.url is required when webview.online is true.".to_string())?;
        let parsed =
            Url::parse(raw).map_err(|error| format!("Invalid webview.url '{raw}': {error}"))?;
        match parsed.scheme() {
            "http" | "https" => Ok(ContentTarget::External(parsed)),
            scheme => Err(format!(
                "Unsupported webview.url scheme '{scheme}', only http/https are allowed."
            )),
        }
    }

    pub(crate) fn uses_ipc_scheme(&self) -> bool {
        !self.online && self.ipc
    }
}

impl AppConfig {
    pub(crate) fn apply_launch_args(&mut self, args: &LaunchArgs) {
        if args.dev {
            self.debug = true;
        }
        if args.remote_debug {
            self.remote_debug = true;
        }
        if args.disable_gpu {
            self.disable_gpu = true;
        }
    }

    pub(crate) fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_OVERRIDE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.webview.url = Some(url);
        }

        if lookup(DISABLE_GPU_ENV).is_some_and(|value| is_truthy(&value)) {
            self.disable_gpu = true;
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Nested objects merge key by key, anything else replaces the base value.
pub(crate) fn merge_config_value(base: &mut Value, overrides: Value) {
    let Value::Object(overrides) = overrides else {
        return;
    };
    if !base.is_object() {
        *base = Value::Object(Map::new());
    }
    let Some(base_object) = base.as_object_mut() else {
        return;
    };

    for (key, value) in overrides {
        match value {
            Value::Object(nested) => match base_object.get_mut(&key) {
                Some(Value::Object(existing)) => existing.extend(nested),
                _ => {
                    base_object.insert(key, Value::Object(nested));
                }
            },
            value => {
                base_object.insert(key, value);
            }
        }
    }
}

/// Overrides come as a JSON object, e.g. `{"window": {"fullScreen": true}}`.
pub(crate) fn parse_config_overrides(raw: Option<&str>) -> Result<Option<Value>, String> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(Some(value)),
        Ok(_) => Err("Config overrides must be a JSON object.".to_string()),
        Err(error) => Err(format!("Failed to parse config overrides: {error}")),
    }
}

fn read_config_value(path: &Path) -> Result<Value, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Value::Object(Map::new()));
        }
        Err(error) => {
            return Err(format!(
                "Failed to read config {}: {}",
                path.display(),
                error
            ));
        }
    };

    serde_json::from_str::<Value>(&raw)
        .map_err(|error| format!("Failed to parse config {}: {}", path.display(), error))
}

pub(crate) fn load_config(
    path: Option<&Path>,
    overrides: Option<Value>,
) -> Result<AppConfig, String> {
    let mut value = match path {
        Some(path) => read_config_value(path)?,
        None => Value::Object(Map::new()),
    };
    if let Some(overrides) = overrides {
        merge_config_value(&mut value, overrides);
    }

    serde_json::from_value(value).map_err(|error| format!("Invalid config: {error}"))
}

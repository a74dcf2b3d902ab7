use std::env;

use crate::render_mode::RenderDecision;

/// WebView2 arguments Tauri passes when none are configured; custom arguments replace them.
const WEBVIEW2_DEFAULT_ARGS: &str =
    "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EngineSettings {
    /// Process environment for WebKitGTK, applied before the toolkit starts.
    pub(crate) env: Vec<(&'static str, String)>,
    /// Browser arguments for WebView2 windows.
    pub(crate) browser_args: String,
}

pub(crate) fn plan_engine_settings(
    decision: &RenderDecision,
    remote_debug_port: Option<u16>,
    extra_browser_args: &[String],
) -> EngineSettings {
    let mut env_plan = Vec::new();
    let mut args = vec![WEBVIEW2_DEFAULT_ARGS.to_string()];

    if decision.use_software_rendering {
        env_plan.push(("WEBKIT_DISABLE_COMPOSITING_MODE", "1".to_string()));
        env_plan.push(("WEBKIT_DISABLE_DMABUF_RENDERER", "1".to_string()));
        args.push("--disable-gpu".to_string());
    }

    if let Some(port) = remote_debug_port {
        env_plan.push(("WEBKIT_INSPECTOR_SERVER", format!("127.0.0.1:{port}")));
        args.push(format!("--remote-debugging-port={port}"));
    }

    args.extend(extra_browser_args.iter().cloned());

    EngineSettings {
        env: env_plan,
        browser_args: args.join(" "),
    }
}

pub(crate) fn parse_extra_browser_args(raw: Option<&str>) -> Result<Vec<String>, String> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(Vec::new());
    };

    shlex::split(raw).ok_or_else(|| format!("Invalid browser arguments: {raw}"))
}

/// Planned variables the process should still receive. Only WebKitGTK reads
/// them, and variables the user already exported are left alone.
pub(crate) fn pending_engine_env<'a, F>(
    settings: &'a EngineSettings,
    reads_engine_env: bool,
    lookup: F,
) -> Vec<(&'static str, &'a str)>
where
    F: Fn(&str) -> Option<String>,
{
    if !reads_engine_env {
        return Vec::new();
    }

    settings
        .env
        .iter()
        .filter(|(key, _)| lookup(key).is_none())
        .map(|(key, value)| (*key, value.as_str()))
        .collect()
}

/// Sets the pending variables and returns their names.
pub(crate) fn apply_engine_env(settings: &EngineSettings) -> Vec<&'static str> {
    let pending = pending_engine_env(settings, cfg!(target_os = "linux"), |key| {
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    });

    pending
        .into_iter()
        .map(|(key, value)| {
            env::set_var(key, value);
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_mode::RenderReason;
    use std::collections::HashMap;

    fn decision(use_software_rendering: bool) -> RenderDecision {
        RenderDecision {
            use_software_rendering,
            reason: if use_software_rendering {
                RenderReason::GpuDisabledByConfig
            } else {
                RenderReason::HardwareAvailable
            },
        }
    }

    #[test]
    fn hardware_rendering_without_debugging_keeps_engine_defaults() {
        let settings = plan_engine_settings(&decision(false), None, &[]);
        assert!(settings.env.is_empty());
        assert_eq!(settings.browser_args, WEBVIEW2_DEFAULT_ARGS);
    }

    #[test]
    fn software_rendering_disables_compositing_and_gpu() {
        let settings = plan_engine_settings(&decision(true), None, &[]);
        assert_eq!(
            settings.env,
            vec![
                ("WEBKIT_DISABLE_COMPOSITING_MODE", "1".to_string()),
                ("WEBKIT_DISABLE_DMABUF_RENDERER", "1".to_string()),
            ]
        );
        assert!(settings.browser_args.ends_with(" --disable-gpu"));
    }

    #[test]
    fn remote_debugging_and_extra_args_are_appended_in_order() {
        let extra = vec!["--lang=en-US".to_string()];
        let settings = plan_engine_settings(&decision(false), Some(9000), &extra);
        assert_eq!(
            settings.env,
            vec![("WEBKIT_INSPECTOR_SERVER", "127.0.0.1:9000".to_string())]
        );
        assert_eq!(
            settings.browser_args,
            format!("{WEBVIEW2_DEFAULT_ARGS} --remote-debugging-port=9000 --lang=en-US")
        );
    }

    #[test]
    fn parse_extra_browser_args_splits_shell_words() {
        assert_eq!(parse_extra_browser_args(None), Ok(Vec::new()));
        assert_eq!(parse_extra_browser_args(Some("   ")), Ok(Vec::new()));
        assert_eq!(
            parse_extra_browser_args(Some(r#"--flag "--name=a b""#)),
            Ok(vec!["--flag".to_string(), "--name=a b".to_string()])
        );
        assert!(parse_extra_browser_args(Some("\"unterminated")).is_err());
    }

    #[test]
    fn pending_engine_env_keeps_user_exported_variables() {
        let settings = plan_engine_settings(&decision(true), Some(9000), &[]);
        let exported = HashMap::from([("WEBKIT_DISABLE_COMPOSITING_MODE", "0")]);

        let pending = pending_engine_env(&settings, true, |key| {
            exported.get(key).map(|value| value.to_string())
        });
        assert_eq!(
            pending,
            vec![
                ("WEBKIT_DISABLE_DMABUF_RENDERER", "1"),
                ("WEBKIT_INSPECTOR_SERVER", "127.0.0.1:9000"),
            ]
        );
        assert!(!pending
            .iter()
            .any(|(key, _)| *key == "WEBKIT_DISABLE_COMPOSITING_MODE"));
    }

    #[test]
    fn pending_engine_env_is_empty_when_engine_ignores_env() {
        let settings = plan_engine_settings(&decision(true), Some(9000), &[]);
        assert!(pending_engine_env(&settings, false, |_| None).is_empty());
    }
}

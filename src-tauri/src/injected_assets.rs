use crate::app_config::AppConfig;

pub(crate) const TRANSPARENT_BACKGROUND_CSS: &str =
    "body, html {background-color:transparent !important;background-image:none !important;}";

const SHELL_STYLE_TAG: &str = "shell";
const USER_STYLE_TAG: &str = "user";

fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Script that inserts or replaces `<style data-webshell="tag">` in the document head.
pub(crate) fn style_injection_script(css: &str, tag: &str) -> String {
    format!(
        r#"(function () {{
  var tag = {tag};
  var css = {css};
  var selector = 'style[data-webshell="' + tag + '"]';
  var style = document.querySelector(selector);
  if (!style) {{
    style = document.createElement('style');
    style.setAttribute('data-webshell', tag);
    (document.head || document.documentElement).appendChild(style);
  }}
  style.textContent = css;
}})();"#,
        tag = json_string(tag),
        css = json_string(css),
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Scripts to evaluate after each main window page load, in order.
pub(crate) fn page_load_scripts(config: &AppConfig) -> Vec<String> {
    let mut scripts = Vec::new();

    if config.window.transparent {
        scripts.push(style_injection_script(
            TRANSPARENT_BACKGROUND_CSS,
            SHELL_STYLE_TAG,
        ));
    }
    if let Some(css) = non_empty(config.webview.add_css.as_deref()) {
        scripts.push(style_injection_script(css, USER_STYLE_TAG));
    }
    if let Some(script) = non_empty(config.webview.run_javascript.as_deref()) {
        scripts.push(script.to_string());
    }

    scripts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_injects_nothing() {
        assert!(page_load_scripts(&AppConfig::default()).is_empty());
    }

    #[test]
    fn transparent_window_css_comes_before_user_assets() {
        let mut config = AppConfig::default();
        config.window.transparent = true;
        config.webview.add_css = Some("h1 { color: red; }".to_string());
        config.webview.run_javascript = Some("console.log('ready');".to_string());

        let scripts = page_load_scripts(&config);
        assert_eq!(scripts.len(), 3);
        assert!(scripts[0].contains(r#"var tag = "shell";"#));
        assert!(scripts[0].contains("background-color:transparent !important"));
        assert!(scripts[1].contains(r#"var tag = "user";"#));
        assert!(scripts[1].contains(r#"var css = "h1 { color: red; }";"#));
        assert_eq!(scripts[2], "console.log('ready');");
    }

    #[test]
    fn blank_user_assets_are_skipped() {
        let mut config = AppConfig::default();
        config.webview.add_css = Some("  ".to_string());
        config.webview.run_javascript = Some(String::new());
        assert!(page_load_scripts(&config).is_empty());
    }

    #[test]
    fn style_injection_script_escapes_css() {
        let script = style_injection_script("a::after { content: \"</style>\\\"\"; }", "user");
        assert!(script.contains(r#"var css = "a::after { content: \"</style>\\\"\"; }";"#));
    }
}

use serde_json::{json, Value};
use shelf_config::BrowserConfig;
use webdriver::capabilities::Capabilities;

/// Construct Chrome command‑line arguments for the configured session.
pub fn build_chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--window-size={},{}", config.window.0, config.window.1),
    ];
    if let Some(ua) = &config.user_agent {
        args.push(format!("--user-agent={ua}"));
    }
    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// WebDriver capabilities carrying the Chrome arguments.
pub fn build_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    let chrome_opts: Value = json!({ "args": build_chrome_arguments(config) });
    caps.insert("goog:chromeOptions".to_string(), chrome_opts);
    caps
}

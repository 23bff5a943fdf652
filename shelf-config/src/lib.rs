//! Loader for harvester configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, then `SHELF_`-prefixed
//! environment variables win (`SHELF_OUTPUT_DIR`, `SHELF_BROWSER__HEADLESS`).
//! String values may reference `${VAR}`; those are expanded before the typed
//! structs are built. Every section has defaults matching the webscraper.io
//! "load more" test shop, so an empty configuration is valid.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use shelf_common::observability::LogFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Landing page of the default target shop.
pub const DEFAULT_HOME_URL: &str = "https://webscraper.io/test-sites/e-commerce/more/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Page visited once before any category, to dismiss the consent banner.
    pub home_url: String,
    /// Directory receiving one CSV file per category.
    pub output_dir: PathBuf,
    pub browser: BrowserConfig,
    pub expansion: ExpansionConfig,
    pub consent: ConsentConfig,
    pub selectors: SelectorConfig,
    /// Processed in declaration order. Empty means the built-in table.
    pub categories: Vec<Category>,
    pub logging: LoggingConfig,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            output_dir: PathBuf::from("."),
            browser: BrowserConfig::default(),
            expansion: ExpansionConfig::default(),
            consent: ConsentConfig::default(),
            selectors: SelectorConfig::default(),
            categories: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// A named catalog listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    pub url: Url,
}

impl Category {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// The six listing pages of the default shop, relative to `home_url`.
pub fn default_categories(home_url: &str) -> Result<Vec<Category>, ConfigError> {
    let home = Url::parse(home_url)
        .map_err(|e| ConfigError::Message(format!("invalid home_url `{home_url}`: {e}")))?;
    [
        ("home", ""),
        ("computers", "computers/"),
        ("phones", "phones/"),
        ("laptops", "computers/laptops"),
        ("tablets", "computers/tablets"),
        ("touch", "phones/touch"),
    ]
    .into_iter()
    .map(|(name, path)| {
        home.join(path)
            .map(|url| Category::new(name, url))
            .map_err(|e| ConfigError::Message(format!("cannot derive `{name}` url: {e}")))
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub window: (u32, u32),
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            window: (1920, 1080),
            user_agent: None,
        }
    }
}

/// Tuning for the "load more" expansion loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub trigger_selector: String,
    pub item_selector: String,
    /// Wait for the trigger to become clickable.
    pub trigger_timeout_ms: u64,
    /// Wait for new items after a click.
    pub content_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Ceiling on trigger activations per page; `null` removes it.
    pub max_rounds: Option<u32>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            trigger_selector: "a.ecomerce-items-scroll-more".to_string(),
            item_selector: ".thumbnail".to_string(),
            trigger_timeout_ms: 3_000,
            content_timeout_ms: 3_000,
            poll_interval_ms: 250,
            max_rounds: Some(1_000),
        }
    }
}

impl ExpansionConfig {
    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_millis(self.trigger_timeout_ms)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_millis(self.content_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    pub selector: String,
    pub timeout_ms: u64,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            selector: ".acceptCookies".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ConsentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// CSS selectors locating each record field beneath an item container.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub container: String,
    pub title: String,
    /// Attribute of the title element holding the full title.
    pub title_attribute: String,
    pub description: String,
    pub price: String,
    pub rating_marker: String,
    pub review_count: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: ".thumbnail".to_string(),
            title: ".title".to_string(),
            title_attribute: "title".to_string(),
            description: ".description".to_string(),
            price: ".price".to_string(),
            rating_marker: "p > .ws-icon-star".to_string(),
            review_count: ".review-count".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            filter: "info".to_string(),
            dir: None,
        }
    }
}

impl ShelfConfig {
    /// Check cross-field constraints the types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.home_url)
            .map_err(|e| invalid(format!("home_url `{}`: {e}", self.home_url)))?;

        if self.categories.is_empty() {
            return Err(invalid("no categories configured"));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(invalid("category with empty name"));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(invalid(format!("duplicate category `{}`", category.name)));
            }
            if !matches!(category.url.scheme(), "http" | "https") {
                return Err(invalid(format!(
                    "category `{}` url `{}` is not http(s)",
                    category.name, category.url
                )));
            }
        }

        let e = &self.expansion;
        if e.trigger_timeout_ms == 0 || e.content_timeout_ms == 0 || e.poll_interval_ms == 0 {
            return Err(invalid("expansion timeouts must be greater than zero"));
        }
        if e.max_rounds == Some(0) {
            return Err(invalid("expansion.max_rounds must be at least 1"));
        }
        Ok(())
    }

    /// Keep only the named categories, in configuration order.
    pub fn retain_categories(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.categories.iter().any(|c| &c.name == *n))
        {
            return Err(invalid(format!("unknown category `{unknown}`")));
        }
        self.categories.retain(|c| names.contains(&c.name));
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Message(msg.into())
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct ShelfConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ShelfConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShelfConfigLoader {
    /// Start with no files; environment overrides are applied last.
    ///
    /// ```
    /// use shelf_config::ShelfConfigLoader;
    ///
    /// let config = ShelfConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(config.categories.len(), 6);
    /// assert_eq!(config.categories[0].name, "home");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use shelf_config::ShelfConfigLoader;
    ///
    /// let cfg = ShelfConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// output_dir: "/tmp/catalog"
    /// categories:
    ///   - name: "phones"
    ///     url: "https://example.com/phones/"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.categories.len(), 1);
    /// assert_eq!(cfg.output_dir.to_str(), Some("/tmp/catalog"));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge sources, expand `${VAR}` placeholders, fill the default category
    /// table when none is given, and validate.
    pub fn load(self) -> Result<ShelfConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: ShelfConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.categories.is_empty() {
            typed.categories = default_categories(&typed.home_url)?;
        }
        typed.validate()?;
        Ok(typed)
    }
}

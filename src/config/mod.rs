/// Configuration system for chatdash.
///
/// Layers, lowest precedence first:
///
/// 1. Built-in defaults from [`schema::ChatdashConfig::default()`]
/// 2. User global config at `~/.chatdash/config.toml`
/// 3. Project config at `.chatdash.toml` in the working directory
/// 4. `CHATDASH_*` environment variables
///
/// Layers are merged key by key on the TOML tree, so a project file that
/// sets only `nlu.url` keeps everything else the global file chose.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml::Value;

pub use schema::ChatdashConfig;

/// Environment variables and the dotted key each one overrides.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("CHATDASH_NLU_URL", "nlu.url"),
    ("CHATDASH_PARSE_TIMEOUT_MS", "nlu.parse_timeout_ms"),
    ("CHATDASH_TRAINING_URL", "training.url"),
    ("CHATDASH_POLL_SECS", "session.status_poll_secs"),
    ("CHATDASH_SENDER_PREFIX", "session.sender_prefix"),
    ("CHATDASH_WEB_ADDR", "web.addr"),
    ("CHATDASH_LOGGING", "logging.enabled"),
];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Unreadable or malformed files are skipped, as are env values that do
/// not fit their key's type; startup never fails on configuration.
pub fn load() -> ChatdashConfig {
    let files = [global_config_path(), project_config_path()];
    let env = ENV_OVERRIDES
        .iter()
        .filter_map(|(var, key)| std::env::var(var).ok().map(|val| (*key, val)));
    resolve(files.iter().flatten().map(PathBuf::as_path), env)
}

/// Merge `files` over the defaults, then apply `env` pairs of
/// `(dotted key, raw value)`.
fn resolve<'a>(
    files: impl IntoIterator<Item = &'a Path>,
    env: impl IntoIterator<Item = (&'a str, String)>,
) -> ChatdashConfig {
    let Ok(mut tree) = Value::try_from(ChatdashConfig::default()) else {
        return ChatdashConfig::default();
    };

    for path in files {
        if let Some(layer) = read_layer(path) {
            merge_tree(&mut tree, layer);
        }
    }

    for (key, raw) in env {
        if raw.is_empty() {
            continue;
        }
        let mut candidate = tree.clone();
        if set_toml_value(&mut candidate, key, &raw).is_ok() && fits_schema(&candidate) {
            tree = candidate;
        }
    }

    tree.try_into().unwrap_or_default()
}

fn read_layer(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    let layer: Value = toml::from_str(&content).ok()?;
    fits_schema(&layer).then_some(layer)
}

/// Whether `tree` deserializes as a [`ChatdashConfig`]. Integer keys are
/// `u64`, so a negative value fails here even though TOML accepts it.
fn fits_schema(tree: &Value) -> bool {
    let parsed: Result<ChatdashConfig, _> = tree.clone().try_into();
    parsed.is_ok()
}

/// Recursively overlay `layer` onto `base`. Tables merge; anything else
/// replaces.
fn merge_tree(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Table(base), Value::Table(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_tree(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chatdash").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".chatdash.toml"))
}

/// Path of the global config file, for display and `config init`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path of the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// One configuration layer as reported by `config show` and `health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub label: String,
    pub present: bool,
}

/// The file and environment layers, lowest precedence first.
pub fn sources() -> Vec<Source> {
    let file = |label: &str, path: Option<PathBuf>| Source {
        label: label.to_string(),
        present: path.is_some_and(|p| p.exists()),
    };
    let mut out = vec![
        file("~/.chatdash/config.toml", global_config_path()),
        file(".chatdash.toml", project_config_path()),
    ];
    out.extend(ENV_OVERRIDES.iter().map(|(var, _)| Source {
        label: (*var).to_string(),
        present: std::env::var_os(var).is_some_and(|v| !v.is_empty()),
    }));
    out
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// init / set / reset / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to the global path.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    write_global(&path, &ChatdashConfig::default_toml())?;
    Ok(path)
}

/// Set one dotted key (e.g. `nlu.url`) in the global config file.
///
/// The updated file must still deserialize as a [`ChatdashConfig`]
/// before it is written.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut tree = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        let mut tree =
            Value::try_from(ChatdashConfig::default()).context("failed to build defaults")?;
        merge_tree(
            &mut tree,
            toml::from_str(&content).context("config file is not valid TOML")?,
        );
        tree
    } else {
        Value::try_from(ChatdashConfig::default()).context("failed to build defaults")?
    };

    set_toml_value(&mut tree, key, value)?;
    let _: ChatdashConfig = tree
        .clone()
        .try_into()
        .with_context(|| format!("'{value}' is not valid for '{key}'"))?;

    let output = toml::to_string_pretty(&tree).context("failed to serialize updated config")?;
    write_global(&path, &output)
}

/// Overwrite the global config with the defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// The effective configuration rendered as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

fn write_global(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.chatdash/ directory")?;
    }
    fs::write(path, content).context("failed to write config file")
}

/// Replace the leaf at `key`, coercing `raw` to the type already there.
fn set_toml_value(root: &mut Value, key: &str, raw: &str) -> Result<()> {
    let (section, leaf) = key.rsplit_once('.').unwrap_or(("", key));
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for part in section.split('.').filter(|p| !p.is_empty()) {
        current = current
            .get_mut(part)
            .with_context(|| format!("unknown config section '{part}' in '{key}'"))?;
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("'{section}' is not a section"))?;

    let coerced = match table.get(leaf) {
        Some(Value::String(_)) => Value::String(raw.to_string()),
        Some(Value::Boolean(_)) => Value::Boolean(is_truthy(raw)),
        Some(Value::Integer(_)) => Value::Integer(
            raw.parse()
                .with_context(|| format!("expected a whole number for '{key}', got '{raw}'"))?,
        ),
        Some(Value::Float(_)) => Value::Float(
            raw.parse()
                .with_context(|| format!("expected a number for '{key}', got '{raw}'"))?,
        ),
        Some(_) => anyhow::bail!("'{key}' cannot be set from the command line"),
        None => anyhow::bail!("unknown config key '{key}'"),
    };
    table.insert(leaf.to_string(), coerced);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! On-disk JSON settings with first-run interactive setup.
//!
//! Settings live at `~/.config/blurrify/settings.json` as an object of
//! absolute path strings. A missing file triggers the interactive prompt
//! (defaults accepted with Enter) and the answers are persisted; a
//! malformed file is an error rather than silently replaced.

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Resolved directory settings consumed by the core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub assets_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tmp_dir: PathBuf,
}

impl Settings {
    /// Home-relative defaults offered by the first-run prompt.
    pub fn defaults() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            assets_dir: home.join(".config/blurrify/assets"),
            input_dir: home.join("Videos"),
            output_dir: home.join("Videos/blurred"),
            tmp_dir: home.join(".cache/blurrify/tmp"),
        }
    }
}

/// Default location of the settings file.
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/blurrify/settings.json")
}

/// Loads the settings file, running the first-run prompt (and persisting
/// the answers) when it does not exist yet.
pub fn load_or_init(path: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)
            .map_err(|e| format!("malformed settings file '{}': {e}", path.display()))?;
        Ok(settings)
    } else {
        let stdin = io::stdin();
        let settings = prompt_from(&mut stdin.lock(), &mut io::stdout())?;
        save(path, &settings)?;
        Ok(settings)
    }
}

/// Persists the settings as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save(path: &Path, settings: &Settings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(settings)?)
}

/// Asks for each directory, falling back to the default on an empty
/// answer. Split out from stdin/stdout so tests can feed synthetic input.
pub fn prompt_from(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Settings> {
    let defaults = Settings::defaults();
    Ok(Settings {
        assets_dir: ask(input, output, "ASSETS_DIR", &defaults.assets_dir)?,
        input_dir: ask(input, output, "INPUT_DIR", &defaults.input_dir)?,
        output_dir: ask(input, output, "OUTPUT_DIR", &defaults.output_dir)?,
        tmp_dir: ask(input, output, "TMP_DIR", &defaults.tmp_dir)?,
    })
}

fn ask(
    input: &mut impl BufRead,
    output: &mut impl Write,
    key: &str,
    default: &Path,
) -> io::Result<PathBuf> {
    write!(output, "{key} [Default: {}]: ", default.display())?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(default.to_path_buf())
    } else {
        Ok(expand_home(answer))
    }
}

/// Expands a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::{AnnotatorOptions, DEFAULT_COALESCE_MS, DEFAULT_THROTTLE_MS};
use crate::document::Punctuation;
use crate::resolver::ViewOptions;

/// Option flags as found on the command line or in an rc file.
///
/// Every boolean turns a default off (or, for `include_punctuation`, on), so
/// merging sources is a plain OR.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub hide_automatic: bool,
    pub include_punctuation: bool,
    pub no_manual_overlap_fix: bool,
    pub keep_overlapping: bool,
    pub no_new_events: bool,
    pub no_delete_events: bool,
    pub no_resize: bool,
    pub no_resize_manual: bool,
    pub no_resize_automatic: bool,
    pub no_new_contexts: bool,
    pub no_delete_contexts: bool,
    pub opening_punct: Vec<String>,
    pub closing_punct: Vec<String>,
    pub throttle_ms: Option<u64>,
    pub coalesce_ms: Option<u64>,
}

/// Settings resolved from [`ConfigFlags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub annotator: AnnotatorOptions,
    pub view: ViewOptions,
    pub throttle_ms: u64,
    pub coalesce_ms: u64,
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans accumulate, values and
    /// punctuation sets in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        let pick = |mine: &Vec<String>, theirs: &Vec<String>| {
            if theirs.is_empty() { mine.clone() } else { theirs.clone() }
        };
        Self {
            hide_automatic: self.hide_automatic || other.hide_automatic,
            include_punctuation: self.include_punctuation || other.include_punctuation,
            no_manual_overlap_fix: self.no_manual_overlap_fix || other.no_manual_overlap_fix,
            keep_overlapping: self.keep_overlapping || other.keep_overlapping,
            no_new_events: self.no_new_events || other.no_new_events,
            no_delete_events: self.no_delete_events || other.no_delete_events,
            no_resize: self.no_resize || other.no_resize,
            no_resize_manual: self.no_resize_manual || other.no_resize_manual,
            no_resize_automatic: self.no_resize_automatic || other.no_resize_automatic,
            no_new_contexts: self.no_new_contexts || other.no_new_contexts,
            no_delete_contexts: self.no_delete_contexts || other.no_delete_contexts,
            opening_punct: pick(&self.opening_punct, &other.opening_punct),
            closing_punct: pick(&self.closing_punct, &other.closing_punct),
            throttle_ms: other.throttle_ms.or(self.throttle_ms),
            coalesce_ms: other.coalesce_ms.or(self.coalesce_ms),
        }
    }

    pub fn options(&self) -> Options {
        let defaults = Punctuation::default();
        let punctuation = Punctuation {
            opening: if self.opening_punct.is_empty() {
                defaults.opening
            } else {
                self.opening_punct.clone()
            },
            closing: if self.closing_punct.is_empty() {
                defaults.closing
            } else {
                self.closing_punct.clone()
            },
        };
        Options {
            annotator: AnnotatorOptions {
                new_events: !self.no_new_events,
                delete_manual_events: !self.no_delete_events,
                resize_events: !self.no_resize,
                resize_manual_events: !self.no_resize_manual,
                resize_automatic_events: !self.no_resize_automatic,
                new_contexts: !self.no_new_contexts,
                delete_manual_contexts: !self.no_delete_contexts,
            },
            view: ViewOptions {
                show_automatic_events: !self.hide_automatic,
                include_punctuation: self.include_punctuation,
                handle_manual_overlaps: !self.no_manual_overlap_fix,
                hide_overlapping_events: !self.keep_overlapping,
                punctuation,
            },
            throttle_ms: self.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS),
            coalesce_ms: self.coalesce_ms.unwrap_or(DEFAULT_COALESCE_MS),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("spanmend").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("spanmend")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("spanmend").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("spanmend")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".spanmendrc")
}

/// Read flags from an rc file. A missing file yields no flags.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write flags to an rc file, creating its directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let switches = [
        (flags.hide_automatic, "--hide-automatic"),
        (flags.include_punctuation, "--include-punctuation"),
        (flags.no_manual_overlap_fix, "--no-manual-overlap-fix"),
        (flags.keep_overlapping, "--keep-overlapping"),
        (flags.no_new_events, "--no-new-events"),
        (flags.no_delete_events, "--no-delete-events"),
        (flags.no_resize, "--no-resize"),
        (flags.no_resize_manual, "--no-resize-manual"),
        (flags.no_resize_automatic, "--no-resize-automatic"),
        (flags.no_new_contexts, "--no-new-contexts"),
        (flags.no_delete_contexts, "--no-delete-contexts"),
    ];
    let mut lines = vec!["# spanmend defaults (saved with --save)".to_string()];
    lines.extend(
        switches
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| (*flag).to_string()),
    );
    lines.extend(flags.opening_punct.iter().map(|p| format!("--opening-punct {p}")));
    lines.extend(flags.closing_punct.iter().map(|p| format!("--closing-punct {p}")));
    if let Some(ms) = flags.throttle_ms {
        lines.push(format!("--throttle-ms {ms}"));
    }
    if let Some(ms) = flags.coalesce_ms {
        lines.push(format!("--coalesce-ms {ms}"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove an rc file if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of a token list; anything else is skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--hide-automatic" => flags.hide_automatic = true,
            "--include-punctuation" => flags.include_punctuation = true,
            "--no-manual-overlap-fix" => flags.no_manual_overlap_fix = true,
            "--keep-overlapping" => flags.keep_overlapping = true,
            "--no-new-events" => flags.no_new_events = true,
            "--no-delete-events" => flags.no_delete_events = true,
            "--no-resize" => flags.no_resize = true,
            "--no-resize-manual" => flags.no_resize_manual = true,
            "--no-resize-automatic" => flags.no_resize_automatic = true,
            "--no-new-contexts" => flags.no_new_contexts = true,
            "--no-delete-contexts" => flags.no_delete_contexts = true,
            "--opening-punct" => flags.opening_punct.extend(value()),
            "--closing-punct" => flags.closing_punct.extend(value()),
            "--throttle-ms" => {
                if let Some(ms) = value().and_then(|v| v.parse().ok()) {
                    flags.throttle_ms = Some(ms);
                }
            }
            "--coalesce-ms" => {
                if let Some(ms) = value().and_then(|v| v.parse().ok()) {
                    flags.coalesce_ms = Some(ms);
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

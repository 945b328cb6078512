use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const PROJECT_FILE_NAME: &str = ".fieldjoinrc";
const MAX_ALIAS_DEPTH: usize = 10;

/// Defaults and aliases read from fieldjoin's INI-style configuration
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Arguments inserted before the user's own on every invocation
    pub defaults: Option<String>,
    /// Named argument bundles, expanded by `--alias NAME`
    pub aliases: IndexMap<String, String>,
}

impl ConfigFile {
    /// Walk up from `start` looking for a project `.fieldjoinrc`
    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    pub fn find_project_config() -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;
        Self::find_project_config_from(&cwd)
    }

    /// User-level config locations, most preferred first
    pub fn user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("fieldjoin").join("config.ini"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(userprofile).join(PROJECT_FILE_NAME));
            }
            return paths;
        }

        let home = env::var("HOME").ok().map(PathBuf::from);
        let xdg_config = env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".config")));

        if let Some(xdg) = xdg_config {
            paths.push(xdg.join("fieldjoin").join("config.ini"));
        }
        if let Some(home) = home {
            paths.push(home.join(PROJECT_FILE_NAME));
        }
        paths
    }

    /// Load the first user config, then overlay the project config
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.merged_with(Self::load_from_path(&path)?);
        }
        if let Some(path) = Self::find_project_config() {
            config = config.merged_with(Self::load_from_path(&path)?);
        }

        Ok(config)
    }

    /// An explicit `--config-file` replaces discovery entirely
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse INI text: a root-level `defaults = ...` plus an `[aliases]` section.
    /// Unknown keys and sections are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section = String::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected 'key = value'", idx + 1))?;
            let (key, value) = (key.trim(), value.trim());

            match section.as_str() {
                "" if key == "defaults" => config.defaults = Some(value.to_string()),
                "aliases" => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Combine two configs; `overlay` wins on conflicts
    fn merged_with(mut self, overlay: Self) -> Self {
        if overlay.defaults.is_some() {
            self.defaults = overlay.defaults;
        }
        self.aliases.extend(overlay.aliases);
        self
    }

    /// Expand one alias, following nested `--alias` references
    pub fn resolve_alias(&self, name: &str) -> Result<Vec<String>> {
        self.resolve_alias_inner(name, &mut HashSet::new(), 0)
    }

    fn resolve_alias_inner(
        &self,
        name: &str,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("alias chain too deep: {} levels", depth));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("circular alias reference: {}", name));
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("unknown alias: {}", name))?;
        let args = shell_words::split(value)
            .with_context(|| format!("invalid alias '{}': failed to parse arguments", name))?;

        let expanded = self.expand(args, |nested| {
            self.resolve_alias_inner(nested, seen, depth + 1)
        })?;

        seen.remove(name);
        Ok(expanded)
    }

    fn expand<F>(&self, args: Vec<String>, mut resolve: F) -> Result<Vec<String>>
    where
        F: FnMut(&str) -> Result<Vec<String>>,
    {
        let mut out = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            if arg == "--alias" {
                let name = iter
                    .next()
                    .ok_or_else(|| anyhow!("--alias requires a NAME"))?;
                out.extend(resolve(&name)?);
            } else if let Some(name) = arg.strip_prefix("--alias=") {
                out.extend(resolve(name)?);
            } else {
                out.push(arg);
            }
        }
        Ok(out)
    }

    /// Insert defaults after the program name, then expand every alias
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut args = args.into_iter();
        let mut combined: Vec<String> = args.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("invalid defaults: failed to parse arguments")?;
            combined.extend(default_args);
        }
        combined.extend(args);

        self.expand(combined, |name| self.resolve_alias(name))
    }

    /// Human-readable report of config locations and the active settings
    pub fn render_show_config() -> String {
        let mut out = String::new();
        let project = Self::find_project_config();
        let user_paths = Self::user_config_paths();

        let _ = writeln!(
            out,
            "Configuration precedence: CLI > project {} > user config > defaults\n",
            PROJECT_FILE_NAME
        );
        let _ = writeln!(out, "Search locations (in precedence order):");
        match &project {
            Some(path) => {
                let _ = writeln!(out, "  1. Project: {} (found)", path.display());
            }
            None => {
                let _ = writeln!(
                    out,
                    "  1. Project: {} (searched up directory tree, not found)",
                    PROJECT_FILE_NAME
                );
            }
        }
        for (i, path) in user_paths.iter().enumerate() {
            let status = if path.is_file() { "found" } else { "not found" };
            let _ = writeln!(out, "  {}. User: {} ({})", i + 2, path.display(), status);
        }

        match Self::load() {
            Ok(config) => out.push_str(&config.describe()),
            Err(e) => {
                let _ = writeln!(out, "\nError loading configuration: {:#}", e);
            }
        }
        out
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        if self.defaults.is_none() && self.aliases.is_empty() {
            let _ = writeln!(out, "\nNo configuration found. Example {}:\n", PROJECT_FILE_NAME);
            let _ = writeln!(out, "defaults = --ignore-case -e NULL");
            let _ = writeln!(out);
            let _ = writeln!(out, "[aliases]");
            let _ = writeln!(out, "left = -a 1");
            let _ = writeln!(out, "full = --outer --stats");
            return out;
        }
        if let Some(defaults) = &self.defaults {
            let _ = writeln!(out, "\nActive defaults:\n  defaults = {}", defaults);
        }
        if !self.aliases.is_empty() {
            let _ = writeln!(out, "\nActive aliases:");
            for (name, value) in &self.aliases {
                let _ = writeln!(out, "  {} = {}", name, value);
            }
        }
        out
    }
}

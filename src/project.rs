//! Project model: the meaning of a project script's keys.
//!
//! ```text
//! base = './src'
//! target = '__location__/build'
//! header_match = '*.h', '*.hpp'
//! header_unmatch = '*_internal.h'
//! command = copy, '__base__', '__target__'
//! ```

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::glob::{Glob, GlobError};
use crate::parser::{Document, ParseError, parse};
use crate::path::{parent, resolve};
use crate::value::{Value, ValueKind};

pub const LOCATION_MACRO: &str = "__location__";
pub const BASE_MACRO: &str = "__base__";
pub const SOURCE_MACRO: &str = "__source__";
pub const TARGET_MACRO: &str = "__target__";

/// Error produced while loading a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("invalid pattern in '{key}': {source}")]
    Glob {
        key: String,
        #[source]
        source: GlobError,
    },
    #[error("'{key}' must be a single string, found a {found}")]
    ExpectedString { key: String, found: ValueKind },
    #[error("failed to walk {path}: {message}")]
    Walk { path: String, message: String },
}

/// A command invocation listed under `command`. Running it is up to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMacro {
    pub name: String,
    pub args: Vec<String>,
}

/// Ordered placeholder substitutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Macros(Vec<(&'static str, String)>);

impl Macros {
    pub fn define(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, old)) => *old = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every defined placeholder in `text`.
    #[must_use]
    pub fn substitute(&self, text: &str) -> String {
        self.0
            .iter()
            .fold(text.to_string(), |acc, (name, value)| acc.replace(name, value))
    }
}

/// A loaded project.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory holding the project script.
    pub location: String,
    /// Root of file discovery.
    pub base: String,
    pub source: Option<String>,
    pub target: Option<String>,
    pub header_match: Vec<Glob>,
    pub header_unmatch: Vec<Glob>,
    pub commands: Vec<CommandMacro>,
    macros: Macros,
}

impl Project {
    /// Read and parse the project script at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, does not parse, or holds
    /// malformed project keys.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let display = path.display().to_string();
        let io = |source| ProjectError::Io {
            path: display.clone(),
            source,
        };

        let text = fs::read_to_string(path).map_err(io)?;
        let document = parse(&text).map_err(|source| ProjectError::Parse {
            path: display.clone(),
            source,
        })?;

        let absolute = std::path::absolute(path).map_err(io)?;
        let script = resolve(&absolute.to_string_lossy(), "");
        Self::from_document(&document, parent(&script))
    }

    /// Build a project from a parsed script living in directory `location`.
    ///
    /// # Errors
    ///
    /// Fails on non-string path keys and invalid glob patterns.
    pub fn from_document(document: &Document, location: &str) -> Result<Self, ProjectError> {
        let macros = path_macros(document, location)?;
        let base = macros
            .get(BASE_MACRO)
            .map_or_else(|| location.to_string(), str::to_string);
        let source = macros.get(SOURCE_MACRO).map(str::to_string);
        let target = macros.get(TARGET_MACRO).map(str::to_string);

        let header_match = glob_entry(document, "header_match", &macros)?;
        let header_unmatch = glob_entry(document, "header_unmatch", &macros)?;

        let commands = document
            .get("command")
            .map(Value::groups)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|group| {
                let mut items = group.iter().map(|s| macros.substitute(s));
                let name = items.next()?;
                Some(CommandMacro {
                    name,
                    args: items.collect(),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            location,
            base = %base,
            includes = header_match.len(),
            excludes = header_unmatch.len(),
            commands = commands.len(),
            "loaded project"
        );

        Ok(Self {
            location: location.to_string(),
            base,
            source,
            target,
            header_match,
            header_unmatch,
            commands,
            macros,
        })
    }

    #[must_use]
    pub const fn macros(&self) -> &Macros {
        &self.macros
    }

    /// Every regular file under `base`, sorted by name within each
    /// directory. A missing base yields nothing.
    ///
    /// # Errors
    ///
    /// Fails when a directory cannot be read.
    pub fn available_files(&self) -> Result<Vec<String>, ProjectError> {
        if !Path::new(&self.base).is_dir() {
            tracing::debug!(base = %self.base, "base is not a directory");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.base).sort_by_file_name() {
            let entry = entry.map_err(|e| ProjectError::Walk {
                path: self.base.clone(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() {
                files.push(resolve(&entry.path().to_string_lossy(), &self.base));
            }
        }

        tracing::debug!(base = %self.base, files = files.len(), "discovered files");
        Ok(files)
    }

    /// Files matched by an include pattern and by no exclude pattern.
    ///
    /// # Errors
    ///
    /// See [`Project::available_files`].
    pub fn header_files(&self) -> Result<Vec<String>, ProjectError> {
        let files: Vec<_> = self
            .available_files()?
            .into_iter()
            .filter(|path| self.is_header_included(path))
            .collect();
        tracing::debug!(selected = files.len(), "selected header files");
        Ok(files)
    }

    #[must_use]
    pub fn is_header_included(&self, path: &str) -> bool {
        self.header_match.iter().any(|g| g.test(path, true))
            && !self.header_unmatch.iter().any(|g| g.test(path, true))
    }
}

/// Path keys and the macro each one defines.
const PATH_KEYS: [(&str, &str); 3] = [
    ("base", BASE_MACRO),
    ("source", SOURCE_MACRO),
    ("target", TARGET_MACRO),
];

/// Resolve the path keys against `location` and define their macros.
///
/// Path keys may refer to each other in any order. A value is resolved once
/// none of the macros it names is still pending; values caught in a cycle
/// keep the macro names they could not expand.
fn path_macros(document: &Document, location: &str) -> Result<Macros, ProjectError> {
    let mut pending = Vec::new();
    for (key, name) in PATH_KEYS {
        match string_entry(document, key)? {
            Some(raw) => pending.push((name, raw)),
            None if name == BASE_MACRO => pending.push((name, location.to_string())),
            None => {}
        }
    }

    let mut macros = Macros::default();
    macros.define(LOCATION_MACRO, location);
    loop {
        let waiting: Vec<&str> = pending.iter().map(|(name, _)| *name).collect();
        let ready = pending
            .iter()
            .position(|(_, raw)| !waiting.iter().any(|name| raw.contains(*name)));
        let Some(index) = ready else { break };
        let (name, raw) = pending.remove(index);
        macros.define(name, resolve(&macros.substitute(&raw), location));
    }
    for (name, raw) in pending {
        tracing::debug!(name, raw = %raw, "circular path macro");
        macros.define(name, resolve(&macros.substitute(&raw), location));
    }
    Ok(macros)
}

fn string_entry(document: &Document, key: &str) -> Result<Option<String>, ProjectError> {
    match document.get(key) {
        None | Some(Value::None) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(raw.clone())),
        Some(other) => Err(ProjectError::ExpectedString {
            key: key.to_string(),
            found: other.kind(),
        }),
    }
}

fn glob_entry(document: &Document, key: &str, macros: &Macros) -> Result<Vec<Glob>, ProjectError> {
    document
        .get(key)
        .map(Value::flatten)
        .unwrap_or_default()
        .iter()
        .map(|pattern| {
            Glob::new(&macros.substitute(pattern)).map_err(|source| ProjectError::Glob {
                key: key.to_string(),
                source,
            })
        })
        .collect()
}

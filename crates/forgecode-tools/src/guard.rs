//! Workspace Guard (§4.1): the only mediator between model-requested
//! filesystem/shell access and the real filesystem.

use forgecode_core::Error;
use std::path::{Path, PathBuf};

/// Substrings that cause a shell command to be refused outright, regardless
/// of where it runs. Not an attempt at a complete sandbox — a last line of
/// defense against the most catastrophic prompt-injected commands.
const DANGEROUS_SUBSTRINGS: &[&str] = &["rm -rf /", "sudo", "shutdown", "reboot", "> /dev/"];

/// Tool output is capped at this many bytes before reaching the model.
pub const MAX_OUTPUT_BYTES: usize = 50_000;

/// Directory names pruned from Glob/Grep traversal (§4.3): build artifacts,
/// caches, and VCS metadata that are never useful search targets and would
/// otherwise dominate walk time.
pub const PRUNED_DIR_NAMES: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".tox",
    "eggs",
    ".eggs",
];

pub fn is_pruned_dir_name(name: &str) -> bool {
    PRUNED_DIR_NAMES.contains(&name)
}

/// A plain value wrapping the workspace root. No mutable state, cheap to
/// clone and share (`Arc`-wrapped) across the registry, the core, and every
/// subagent.
#[derive(Clone, Debug)]
pub struct WorkspaceGuard {
    root: PathBuf,
}

impl WorkspaceGuard {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied path against the workspace root, failing if
    /// the result (after resolving symlinks) would escape it.
    ///
    /// Relative paths are joined to the root. The joined path need not exist
    /// yet (e.g. a `Write` target) — in that case containment is checked
    /// against the canonicalized nearest existing ancestor instead of the
    /// path itself.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, Error> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let canonical_root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());

        let candidate = canonicalize_best_effort(&joined);

        if candidate.starts_with(&canonical_root) {
            Ok(candidate)
        } else {
            Err(Error::WorkspaceEscape {
                path: path.to_string(),
            })
        }
    }

    /// Refuse a command containing any dangerous substring.
    pub fn check_command(&self, command: &str) -> Result<(), Error> {
        for needle in DANGEROUS_SUBSTRINGS {
            if command.contains(needle) {
                return Err(Error::DangerousCommand);
            }
        }
        Ok(())
    }

    /// Truncate `output` to at most `MAX_OUTPUT_BYTES`, never splitting a
    /// multi-byte UTF-8 code point.
    pub fn truncate_output(output: &str) -> String {
        truncate_utf8(output, MAX_OUTPUT_BYTES)
    }
}

/// Canonicalize as much of `path` as exists, then re-append the remaining
/// (not-yet-created) components untouched.
fn canonicalize_best_effort(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();
    while !existing.exists() {
        match existing.components().next_back() {
            Some(component) => {
                tail.push(component.as_os_str().to_owned());
                existing.pop();
            }
            None => break,
        }
    }

    let mut resolved = existing.canonicalize().unwrap_or(existing);
    for component in tail.into_iter().rev() {
        resolved.push(component);
    }
    resolved
}

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = s[..end].to_string();
    truncated.push_str(&format!("\n... ({} more bytes)", s.len() - end));
    truncated
}

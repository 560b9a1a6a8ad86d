//! Skill Index (§4.7): a two-layer skill-loading model. The description
//! layer is cheap enough to sit permanently in the system prompt; the body
//! layer is loaded on demand by the Skill tool.

use forgecode_core::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const RESOURCE_DIRS: &[&str] = &["scripts", "references", "examples", "assets"];

#[derive(Clone, Debug)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub body: String,
    pub skill_dir: PathBuf,
}

/// Parsed skills keyed by name. Read-only after construction, so it can be
/// shared (via `Arc`) across an agent and its subagents without locking.
#[derive(Default)]
pub struct SkillIndex {
    skills: HashMap<String, Skill>,
    /// Preserves discovery order so `get_descriptions()` is stable.
    order: Vec<String>,
}

impl SkillIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `<workspace>/.claude/skills/*/SKILL.md`, then any plugin skills
    /// named in `<home>/.claude/plugins/installed_plugins.json`. Local names
    /// win ties: a name already present is never overwritten.
    pub fn load(workspace_root: &Path) -> Self {
        let mut index = Self::new();

        let local_dir = workspace_root.join(".claude").join("skills");
        index.scan_dir(&local_dir);

        if let Some(home) = dirs::home_dir() {
            let manifest_path = home
                .join(".claude")
                .join("plugins")
                .join("installed_plugins.json");
            if let Ok(text) = std::fs::read_to_string(&manifest_path) {
                if let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&text) {
                    if let Some(plugins) = manifest.get("plugins").and_then(|v| v.as_object()) {
                        for entries in plugins.values() {
                            let Some(entries) = entries.as_array() else {
                                continue;
                            };
                            for entry in entries {
                                if let Some(install_path) =
                                    entry.get("installPath").and_then(|v| v.as_str())
                                {
                                    index.scan_dir(&Path::new(install_path).join("skills"));
                                }
                            }
                        }
                    }
                }
            }
        }

        index
    }

    fn scan_dir(&mut self, skills_dir: &Path) {
        let Ok(entries) = std::fs::read_dir(skills_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let skill_dir = entry.path();
            if !skill_dir.is_dir() {
                continue;
            }
            let manifest = skill_dir.join("SKILL.md");
            let Ok(text) = std::fs::read_to_string(&manifest) else {
                continue;
            };
            match parse_skill(&text, &skill_dir) {
                Some(skill) => self.insert_if_unseen(skill),
                None => debug!(path = %manifest.display(), "skipping malformed SKILL.md"),
            }
        }
    }

    fn insert_if_unseen(&mut self, skill: Skill) {
        if self.skills.contains_key(&skill.name) {
            return;
        }
        self.order.push(skill.name.clone());
        self.skills.insert(skill.name.clone(), skill);
    }

    pub fn list_skills(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// The cheap description layer, one line per skill, for the system
    /// prompt.
    pub fn get_descriptions(&self) -> String {
        if self.order.is_empty() {
            return "(no skills available)".to_string();
        }
        self.order
            .iter()
            .filter_map(|name| self.skills.get(name))
            .map(|s| format!("- {}: {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The full body layer plus an "Available Resources" addendum, for the
    /// Skill tool to load on demand.
    pub fn get_skill(&self, name: &str) -> Result<String, Error> {
        let skill = self.skills.get(name).ok_or_else(|| Error::UnknownSkill {
            name: name.to_string(),
            available: self.list_skills().join(", "),
        })?;

        let mut rendered = if skill.body.starts_with("# ") {
            skill.body.clone()
        } else {
            format!("# Skill: {}\n\n{}", skill.name, skill.body)
        };

        let mut resources = Vec::new();
        for dir_name in RESOURCE_DIRS {
            let dir = skill.skill_dir.join(dir_name);
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                if let Some(file_name) = entry.file_name().to_str() {
                    resources.push(format!("{dir_name}/{file_name}"));
                }
            }
        }
        if !resources.is_empty() {
            rendered.push_str("\n\n## Available Resources\n\n");
            for resource in resources {
                rendered.push_str(&format!("- {resource}\n"));
            }
        }

        Ok(rendered)
    }
}

/// Parse `---\n<frontmatter>\n---\n<body>`. Returns `None` on any structural
/// or required-key failure; callers treat that as "skip this file".
fn parse_skill(text: &str, skill_dir: &Path) -> Option<Skill> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest.find("\n---")?;
    let frontmatter = &rest[..end];
    let body = rest[end + 4..].trim_start_matches('\n').to_string();

    let mut name = None;
    let mut description = None;
    for line in frontmatter.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = unquote(value.trim());
        match key {
            "name" => name = Some(value),
            "description" => description = Some(value),
            _ => {}
        }
    }

    Some(Skill {
        name: name?,
        description: description?,
        body,
        skill_dir: skill_dir.to_path_buf(),
    })
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

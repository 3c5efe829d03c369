//! SKILL.md 技能发现
//! SKILL.md skill discovery
//!
//! A skill directory looks like:
//!
//! ```text
//! code_review/
//! ├── SKILL.md            # YAML front-matter (Level 1) + markdown body (Level-2 prompt)
//! ├── instructions.yaml   # optional: examples, parameters, guidelines, limitations
//! ├── packages.txt        # optional: one package per line, `#` comments
//! ├── scripts/            # Level 3
//! ├── templates/          # Level 3
//! ├── config/             # Level 3
//! └── data/               # Level 3 (binary)
//! ```
//!
//! Scanning keeps only the front-matter. [`FsInstructionsLoader`] and [`FsResourcesLoader`]
//! read the rest when the entity first asks for it.

use super::descriptor::SkillDescriptor;
use super::progressive::{ProgressiveSkillBuilder, ProgressiveSkillEntity};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use skillkit_kernel::{
    BoxError, InstructionsLoader, ResourcesLoader, SkillCategory, SkillContext, SkillError,
    SkillInstructions, SkillResources, SkillResult,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const SKILL_FILE: &str = "SKILL.md";
pub const INSTRUCTIONS_FILE: &str = "instructions.yaml";
pub const PACKAGES_FILE: &str = "packages.txt";

/// SKILL.md front-matter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillManifest {
    /// 唯一标识（缺省为目录名）
    /// Unique id, defaults to the directory name
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
}

impl SkillManifest {
    /// Resolve into a descriptor; `fallback_id` is used when the front-matter has no id.
    pub fn into_descriptor(self, fallback_id: &str) -> SkillDescriptor {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| fallback_id.to_string());
        let mut descriptor = SkillDescriptor::new(id);

        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            descriptor.name = name;
        }
        descriptor.description = self.description;
        let category: SkillCategory = match self.category.as_deref() {
            None => SkillCategory::General,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("Skill {}: {}, using general", descriptor.id, e);
                SkillCategory::General
            }),
        };
        descriptor.category = category;
        for tag in self.tags {
            descriptor.push_tag(tag);
        }
        for dep in self.dependencies {
            descriptor.push_dependency(dep);
        }

        let metadata = &mut descriptor.metadata;
        if let Some(version) = self.version {
            metadata.version = version;
        }
        metadata.author = self.author;
        metadata.license = self.license;
        metadata.repository = self.repository;
        descriptor
    }
}

/// 解析 SKILL.md：返回 front-matter 与正文
/// Split a SKILL.md document into its front-matter and markdown body
pub fn parse_skill_md(content: &str) -> SkillResult<(SkillManifest, String)> {
    let frontmatter_regex = Regex::new(r"^\x{FEFF}?---[ \t]*\r?\n([\s\S]*?)\r?\n---[ \t]*(?:\r?\n([\s\S]*))?$")
        .map_err(|e| SkillError::InvalidConfig(e.to_string()))?;

    let caps = frontmatter_regex.captures(content).ok_or_else(|| {
        SkillError::InvalidConfig(format!("{SKILL_FILE} must start with YAML front-matter"))
    })?;

    let manifest: SkillManifest = serde_yaml::from_str(&caps[1]).map_err(|e| {
        SkillError::InvalidConfig(format!("failed to parse {SKILL_FILE} front-matter: {e}"))
    })?;
    let body = caps.get(2).map_or("", |m| m.as_str()).to_string();
    Ok((manifest, body))
}

/// A skill found on disk: its Level-1 descriptor and its directory.
#[derive(Debug, Clone)]
pub struct DiscoveredSkill {
    pub descriptor: SkillDescriptor,
    pub root: PathBuf,
}

impl DiscoveredSkill {
    /// Build a progressive entity whose Level 2 and Level 3 are read from `root`.
    pub fn into_entity(self) -> SkillResult<ProgressiveSkillEntity> {
        ProgressiveSkillBuilder::from_descriptor(self.descriptor)
            .with_instructions_loader(FsInstructionsLoader::new(&self.root))
            .with_resources_loader(FsResourcesLoader::new(&self.root))
            .build()
    }
}

/// 技能目录扫描器
/// Scanner for skill directories
#[derive(Debug, Clone, Default)]
pub struct SkillDiscovery {
    search_dirs: Vec<PathBuf>,
}

impl SkillDiscovery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dirs: vec![dir.into()],
        }
    }

    /// Scan several directories; earlier ones win when ids collide.
    pub fn with_search_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// 扫描第 1 级元数据
    /// Scan every search directory for skills, returning them sorted by id
    ///
    /// Directories that are missing or unreadable, and skills whose `SKILL.md` fails to parse,
    /// are skipped with a warning.
    pub fn scan(&self) -> Vec<DiscoveredSkill> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for dir in &self.search_dirs {
            if !dir.is_dir() {
                warn!("Skills directory {} does not exist", dir.display());
                continue;
            }

            let mut count = 0;
            for entry in WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_dir())
            {
                let skill_md = entry.path().join(SKILL_FILE);
                if !skill_md.is_file() {
                    continue;
                }
                let Some(skill) = read_skill_dir(entry.path(), &skill_md) else {
                    continue;
                };
                if !seen.insert(skill.descriptor.id.clone()) {
                    debug!(
                        "Skill {} in {} shadowed by an earlier directory",
                        skill.descriptor.id,
                        entry.path().display()
                    );
                    continue;
                }
                found.push(skill);
                count += 1;
            }
            info!("Scanned {} skills from {}", count, dir.display());
        }

        found.sort_by(|a, b| a.descriptor.id.cmp(&b.descriptor.id));
        found
    }
}

fn read_skill_dir(root: &Path, skill_md: &Path) -> Option<DiscoveredSkill> {
    let content = match std::fs::read_to_string(skill_md) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", skill_md.display(), e);
            return None;
        }
    };
    let manifest = match parse_skill_md(&content) {
        Ok((manifest, _body)) => manifest,
        Err(e) => {
            warn!("Skipping {}: {}", skill_md.display(), e);
            return None;
        }
    };

    let dir_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let descriptor = manifest.into_descriptor(&dir_name);
    if let Err(e) = descriptor.validate() {
        warn!("Skipping {}: {}", skill_md.display(), e);
        return None;
    }

    Some(DiscoveredSkill {
        descriptor,
        root: root.to_path_buf(),
    })
}

// ============================================================================
// 加载器
// ============================================================================

/// 从技能目录读取第 2 级数据
/// Reads Level 2 from a skill directory
#[derive(Debug, Clone)]
pub struct FsInstructionsLoader {
    root: PathBuf,
}

impl FsInstructionsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl InstructionsLoader for FsInstructionsLoader {
    async fn load_instructions(
        &self,
        _ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillInstructions, BoxError> {
        let content = tokio::fs::read_to_string(self.root.join(SKILL_FILE)).await?;
        let (_, body) = parse_skill_md(&content)?;

        let extra = self.root.join(INSTRUCTIONS_FILE);
        let mut instructions = if tokio::fs::try_exists(&extra).await? {
            let raw = tokio::fs::read_to_string(&extra).await?;
            serde_yaml::from_str::<SkillInstructions>(&raw)?
        } else {
            SkillInstructions::default()
        };

        let body = body.trim();
        if !body.is_empty() {
            instructions.system_prompt = body.to_string();
        }
        debug!(
            "Read instructions for skill {} from {}",
            skill_id,
            self.root.display()
        );
        Ok(instructions)
    }
}

/// 从技能目录读取第 3 级数据
/// Reads Level 3 from a skill directory
#[derive(Debug, Clone)]
pub struct FsResourcesLoader {
    root: PathBuf,
}

impl FsResourcesLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResourcesLoader for FsResourcesLoader {
    async fn load_resources(
        &self,
        _ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillResources, BoxError> {
        let root = self.root.clone();
        let resources = tokio::task::spawn_blocking(move || read_resources(&root)).await??;
        debug!(
            "Read {} bytes of resources for skill {}",
            resources.total_bytes(),
            skill_id
        );
        Ok(resources)
    }
}

fn read_resources(root: &Path) -> Result<SkillResources, BoxError> {
    let mut resources = SkillResources::new();

    for (name, path) in files_under(&root.join("scripts"))? {
        resources.scripts.insert(name, std::fs::read_to_string(path)?);
    }
    for (name, path) in files_under(&root.join("templates"))? {
        resources.templates.insert(name, std::fs::read_to_string(path)?);
    }
    for (name, path) in files_under(&root.join("config"))? {
        resources.configs.insert(name, std::fs::read_to_string(path)?);
    }
    for (name, path) in files_under(&root.join("data"))? {
        resources.data.insert(name, std::fs::read(path)?);
    }

    let packages = root.join(PACKAGES_FILE);
    if packages.is_file() {
        resources.packages = std::fs::read_to_string(packages)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();
    }

    Ok(resources)
}

/// Regular files below `dir`, named by their `/`-separated path relative to `dir`.
fn files_under(dir: &Path) -> Result<Vec<(String, PathBuf)>, BoxError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(dir)?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, entry.into_path()));
    }
    Ok(files)
}

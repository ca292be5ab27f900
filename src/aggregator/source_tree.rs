//! Source files and the folder hierarchy above them.
//!
//! Symbols with a source path are grouped into [`SourceFile`]s, and every
//! directory prefix of those paths becomes a [`Folder`]. On top of the real
//! hierarchy a collapsed view is computed for display: file-less top-level
//! folders and file-less single-child folders are folded into the names of
//! their descendants, e.g. `lib/` → `lib/vendor/` → `lib/vendor/zlib/*.c`
//! shows up as a single `lib/vendor/zlib` entry.

use crate::parser::schema::{Address, SymbolTable};
use crate::utils::config::CURRENT_FOLDER;
use crate::utils::path::{base_file, normalize_path, parent_dir};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One source file referenced by at least one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Base name, e.g. `puncover.c`
    pub name: String,
    /// Normalized path, unique key
    pub path: String,
    /// Key of the owning folder
    pub folder: String,
    /// Symbols defined in this file
    pub symbols: BTreeSet<Address>,
}

/// One directory of the normalized path space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    /// Normalized path, unique key
    pub path: String,
    pub parent: Option<String>,
    pub sub_folders: BTreeSet<String>,
    /// Direct children only
    pub files: BTreeSet<String>,
    /// Top-level ancestor; `None` for top-level folders
    pub root: Option<String>,
    /// Sub-folders with file-less single-child chains skipped
    pub collapsed_sub_folders: BTreeSet<String>,
    /// Display name including folded ancestors
    pub collapsed_name: String,
}

impl Folder {
    fn new(path: &str, parent: Option<&str>) -> Self {
        let name = base_file(path).to_string();
        Self {
            collapsed_name: name.clone(),
            name,
            path: path.to_string(),
            parent: parent.map(str::to_string),
            sub_folders: BTreeSet::new(),
            files: BTreeSet::new(),
            root: None,
            collapsed_sub_folders: BTreeSet::new(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Owns no file and has exactly one sub-folder
    pub fn is_pass_through(&self) -> bool {
        self.files.is_empty() && self.sub_folders.len() == 1
    }

    /// Folded into its descendants in the collapsed view
    pub fn is_elided(&self) -> bool {
        self.files.is_empty() && (self.is_top_level() || self.sub_folders.len() == 1)
    }
}

/// Files and folders keyed by normalized path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    files: BTreeMap<String, SourceFile>,
    folders: BTreeMap<String, Folder>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the file at `path`, creating its folder chain
    pub fn file_for_path(&mut self, path: &str) -> &mut SourceFile {
        let path = normalize_path(path);
        let folder = parent_dir(&path).unwrap_or(CURRENT_FOLDER).to_string();

        if !self.files.contains_key(&path) {
            self.ensure_folder(&folder);
            if let Some(owner) = self.folders.get_mut(&folder) {
                owner.files.insert(path.clone());
            }
        }

        self.files.entry(path.clone()).or_insert_with(|| SourceFile {
            name: base_file(&path).to_string(),
            path: path.clone(),
            folder,
            symbols: BTreeSet::new(),
        })
    }

    /// Look up or create the folder at `path` and all its ancestors
    pub fn folder_for_path(&mut self, path: &str) -> &mut Folder {
        let path = normalize_path(path);
        self.ensure_folder(&path);
        self.folders
            .entry(path.clone())
            .or_insert_with(|| Folder::new(&path, None))
    }

    fn ensure_folder(&mut self, path: &str) {
        if self.folders.contains_key(path) {
            return;
        }
        let parent = parent_dir(path);
        if let Some(parent) = parent {
            self.ensure_folder(parent);
            if let Some(owner) = self.folders.get_mut(parent) {
                owner.sub_folders.insert(path.to_string());
            }
        }
        self.folders
            .insert(path.to_string(), Folder::new(path, parent));
    }

    /// Group every symbol with a path into its source file
    ///
    /// **Public** - enhancement pass run by the collector
    ///
    /// Symbol paths are normalized again so that records entered without going
    /// through a parser end up under the same key.
    pub fn derive_files(&mut self, table: &mut SymbolTable) -> usize {
        let mut grouped = 0;
        for symbol in table.iter_mut() {
            let Some(path) = symbol.path.clone() else {
                continue;
            };
            symbol.set_path(&path);
            let file = self.file_for_path(&path);
            file.symbols.insert(symbol.address);
            symbol.file = Some(file.path.clone());
            grouped += 1;
        }
        debug!(
            "Grouped {} symbols into {} files and {} folders",
            grouped,
            self.files.len(),
            self.folders.len()
        );
        grouped
    }

    /// Compute `root`, `collapsed_name` and `collapsed_sub_folders` of every folder
    ///
    /// **Public** - enhancement pass run by the collector
    pub fn collapse(&mut self) {
        // Key order visits every parent before its children.
        let paths: Vec<String> = self.folders.keys().cloned().collect();

        for path in &paths {
            let Some(folder) = self.folders.get(path) else {
                continue;
            };
            let (root, collapsed_name) = match folder.parent.as_deref().and_then(|p| self.folders.get(p)) {
                Some(parent) => {
                    let root = parent.root.clone().unwrap_or_else(|| parent.path.clone());
                    let name = if parent.is_elided() {
                        format!("{}/{}", parent.collapsed_name, folder.name)
                    } else {
                        folder.name.clone()
                    };
                    (Some(root), name)
                }
                None => (None, folder.name.clone()),
            };
            let collapsed_sub_folders = folder
                .sub_folders
                .iter()
                .map(|sub| self.skip_pass_through(sub))
                .collect();

            if let Some(folder) = self.folders.get_mut(path) {
                folder.root = root;
                folder.collapsed_name = collapsed_name;
                folder.collapsed_sub_folders = collapsed_sub_folders;
            }
        }
    }

    /// Follow a chain of pass-through folders down to the first folder that
    /// owns files or branches
    fn skip_pass_through(&self, path: &str) -> String {
        let mut current = path;
        while let Some(folder) = self.folders.get(current) {
            if !folder.is_pass_through() {
                break;
            }
            match folder.sub_folders.iter().next() {
                Some(only) => current = only,
                None => break,
            }
        }
        current.to_string()
    }

    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.files.get(&normalize_path(path))
    }

    pub fn folder(&self, path: &str) -> Option<&Folder> {
        self.folders.get(&normalize_path(path))
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    /// Top-level folders of the real hierarchy
    pub fn root_folders(&self) -> Vec<&Folder> {
        self.folders.values().filter(|f| f.is_top_level()).collect()
    }

    /// Display roots of the collapsed hierarchy
    ///
    /// File-less top-level folders are replaced by their (collapsed) sub-folders.
    pub fn collapsed_root_folders(&self) -> Vec<&Folder> {
        let mut roots: BTreeSet<String> = BTreeSet::new();
        for folder in self.root_folders() {
            if folder.files.is_empty() {
                roots.extend(folder.sub_folders.iter().map(|s| self.skip_pass_through(s)));
            } else {
                roots.insert(folder.path.clone());
            }
        }
        roots.iter().filter_map(|p| self.folders.get(p)).collect()
    }
}

// src/services/file_service.rs
// DOCUMENTATION: Directory browsing and static asset resolution
// PURPOSE: Read-only filesystem access for the assets directory

use crate::errors::AppError;
use crate::models::{DirectoryEntry, DirectoryListing, EntryType};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

pub struct FileService;

impl FileService {
    /// List a directory, inlining the text of `.txt` files
    /// DOCUMENTATION: A failure reading one file is reported in its `content`, not as an error
    pub fn get_directory_contents(dir: &Path) -> Result<DirectoryListing, AppError> {
        if !dir.exists() {
            return Err(AppError::NotFound(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }
        if !dir.is_dir() {
            return Err(AppError::InvalidInput(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let entry_type = if metadata.is_file() {
                EntryType::File
            } else {
                EntryType::Directory
            };

            let modify_time = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            let content = if entry_type == EntryType::File && is_text_file(&name) {
                Some(match fs::read(&path) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(e) => format!("Read failed: {}", e),
                })
            } else {
                None
            };

            items.push(DirectoryEntry {
                name,
                entry_type,
                modify_time,
                path: path.to_string_lossy().into_owned(),
                content,
            });
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(DirectoryListing {
            directory: dir.to_string_lossy().into_owned(),
            count: items.len(),
            items,
        })
    }

    /// Join `relative` under `root`, refusing anything that could escape it
    pub fn resolve_asset(root: &Path, relative: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(relative);
        let mut resolved = root.to_path_buf();

        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    log::warn!("Rejected static path {}", relative.display());
                    return Err(AppError::InvalidInput("Invalid file path".to_string()));
                }
            }
        }

        if !resolved.is_file() {
            return Err(AppError::NotFound(format!(
                "File not found: {}",
                relative.display()
            )));
        }

        Ok(resolved)
    }
}

fn is_text_file(name: &str) -> bool {
    name.to_lowercase().ends_with(".txt")
}

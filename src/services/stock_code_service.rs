// src/services/stock_code_service.rs
// DOCUMENTATION: Stock code allocation ledger and per-code data files
// PURPOSE: Keep the stock_codes table and the data directory consistent

use crate::db::StockCodeRepository;
use crate::errors::AppError;
use crate::models::{CodeStats, StockCode, StockCodeInfo};
use crate::services::LocalClock;
use regex::Regex;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the code list inside the assets directory
pub const CODE_LIST_FILE: &str = "a.txt";

const MAX_CODE_LEN: usize = 16;

/// Codes appear as `名称(300157)` in the code list
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+)\)").unwrap());

/// Distinct codes found in a code list, in ascending order
pub fn extract_codes(content: &str) -> Vec<String> {
    CODE_PATTERN
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Codes double as file names, so only short ASCII alphanumerics are accepted
pub fn validate_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > MAX_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::ValidationError(format!("Invalid stock code: {}", code)));
    }
    Ok(())
}

/// StockCodeService: hands out unused codes and stores each used code's payload on disk
/// DOCUMENTATION: The ledger row is the source of truth for used/unused,
/// `<data_dir>/<code>.txt` holds the payload. The legacy codeData column stays NULL.
#[derive(Clone)]
pub struct StockCodeService {
    pool: SqlitePool,
    clock: LocalClock,
    assets_dir: PathBuf,
    data_dir: PathBuf,
}

impl StockCodeService {
    /// Create the service, making sure the data directory exists
    pub fn new(
        pool: SqlitePool,
        clock: LocalClock,
        assets_dir: PathBuf,
        data_dir: PathBuf,
    ) -> Result<Self, AppError> {
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| {
                log::error!("Failed to create data directory {}: {}", data_dir.display(), e);
                AppError::StorageError(e.to_string())
            })?;
            log::info!("Created data directory: {}", data_dir.display());
        }

        Ok(Self {
            pool,
            clock,
            assets_dir,
            data_dir,
        })
    }

    fn data_file(&self, code: &str) -> PathBuf {
        self.data_dir.join(format!("{}.txt", code))
    }

    /// Not a `.txt`, so listings and exports never pick it up
    fn staged_file(&self, code: &str) -> PathBuf {
        self.data_dir.join(format!("{}.txt.part", code))
    }

    /// Import codes from `<assets_dir>/a.txt`
    /// DOCUMENTATION: Returns the number of distinct codes found. Never fails:
    /// problems are logged so startup carries on without the import.
    pub async fn import_codes(&self) -> usize {
        let path = self.assets_dir.join(CODE_LIST_FILE);
        if !path.exists() {
            log::warn!("Code list not found: {}", path.display());
            return 0;
        }

        let content = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::error!("Failed to read code list {}: {}", path.display(), e);
                return 0;
            }
        };

        let codes = extract_codes(&content);
        let created_at = self.clock.now_string();

        match StockCodeRepository::insert_missing(&self.pool, &codes, &created_at).await {
            Ok(inserted) => {
                log::info!(
                    "Initialized {} stock codes from {} ({} new)",
                    codes.len(),
                    CODE_LIST_FILE,
                    inserted
                );
                codes.len()
            }
            Err(e) => {
                log::error!("Failed to initialize stock codes: {}", e);
                0
            }
        }
    }

    pub async fn get_unused_code(&self) -> Result<Option<StockCode>, AppError> {
        StockCodeRepository::first_unused(&self.pool).await
    }

    /// Mark `code` as used, storing `code_data` in its data file
    /// DOCUMENTATION: The payload is staged next to the data file and only renamed
    /// over it once the ledger row is updated, so an unknown code or a failed update
    /// leaves any previous payload in place. Returns the new `used_at`, None for an unknown code.
    pub async fn mark_code_as_used(
        &self,
        code: &str,
        code_data: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        validate_code(code)?;

        let staged = match code_data {
            Some(data) => {
                let staged = self.staged_file(code);
                fs::write(&staged, data).map_err(|e| {
                    log::error!("Failed to write data file {}: {}", staged.display(), e);
                    AppError::StorageError(e.to_string())
                })?;
                Some(staged)
            }
            None => None,
        };

        let used_at = self.clock.now_string();
        let updated = match StockCodeRepository::mark_used(&self.pool, code, &used_at).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(staged) = &staged {
                    self.remove_data_file(staged);
                }
                return Err(e);
            }
        };

        if !updated {
            if let Some(staged) = &staged {
                self.remove_data_file(staged);
            }
            return Ok(None);
        }

        if let Some(staged) = &staged {
            let path = self.data_file(code);
            fs::rename(staged, &path).map_err(|e| {
                log::error!("Failed to move data file into {}: {}", path.display(), e);
                AppError::StorageError(e.to_string())
            })?;
        }

        log::info!("Marked code {} as used at {}", code, used_at);
        Ok(Some(used_at))
    }

    fn remove_data_file(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            log::error!("Failed to remove data file {}: {}", path.display(), e);
        }
    }

    /// Reset every code to unused and delete all data files
    /// DOCUMENTATION: Files that cannot be removed are logged and skipped. Returns rows reset.
    pub async fn reset_code_usage(&self) -> Result<u64, AppError> {
        let reset = StockCodeRepository::reset_all(&self.pool).await?;

        for path in self.data_files()? {
            match fs::remove_file(&path) {
                Ok(()) => log::info!("Removed data file: {}", path.display()),
                Err(e) => log::error!("Failed to remove file {}: {}", path.display(), e),
            }
        }

        log::info!("Reset usage of {} stock codes", reset);
        Ok(reset)
    }

    /// Ledger row plus the content of its data file
    pub async fn get_code_info(&self, code: &str) -> Result<Option<StockCodeInfo>, AppError> {
        validate_code(code)?;
        let record = StockCodeRepository::find_by_code(&self.pool, code).await?;
        Ok(record.map(|record| self.with_data(record)))
    }

    /// All used codes with their data, most recently used first
    pub async fn get_all_used_codes(&self) -> Result<Vec<StockCodeInfo>, AppError> {
        let rows = StockCodeRepository::list_used(&self.pool).await?;
        Ok(rows.into_iter().map(|r| self.with_data(r)).collect())
    }

    /// Used code strings only, most recently used first
    pub async fn get_used_code_list(&self) -> Result<Vec<String>, AppError> {
        let rows = StockCodeRepository::list_used(&self.pool).await?;
        Ok(rows.into_iter().map(|r| r.code).collect())
    }

    pub async fn stats(&self) -> Result<CodeStats, AppError> {
        StockCodeRepository::stats(&self.pool).await
    }

    /// Raw data file of one code as (file name, bytes)
    pub fn export_code_data(&self, code: &str) -> Result<Option<(String, Vec<u8>)>, AppError> {
        validate_code(code)?;
        let path = self.data_file(code);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some((format!("{}.txt", code), bytes)))
    }

    /// Zip archive of every data file, each stored under its own name
    pub fn export_all_code_data(&self) -> Result<Vec<u8>, AppError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut files = self.data_files()?;
        files.sort();

        for path in &files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let bytes = fs::read(path)?;
            zip.start_file(name, options).map_err(zip_error)?;
            zip.write_all(&bytes)?;
        }

        let cursor = zip.finish().map_err(zip_error)?;
        log::info!("Exported {} data files", files.len());
        Ok(cursor.into_inner())
    }

    /// Attachment name for a full export, stamped with local time
    pub fn archive_name(&self) -> String {
        format!("code_data_{}.zip", self.clock.now().format("%Y%m%d_%H%M%S"))
    }

    fn data_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| {
            log::error!("Directory read error {}: {}", self.data_dir.display(), e);
            AppError::StorageError(e.to_string())
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_txt = path.extension().map(|ext| ext == "txt").unwrap_or(false);
            if is_txt && path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn with_data(&self, record: StockCode) -> StockCodeInfo {
        let path = self.data_file(&record.code);
        let code_data = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(data) => Some(data),
                Err(e) => {
                    log::error!("File read error for {}: {}", record.code, e);
                    None
                }
            }
        } else {
            None
        };

        StockCodeInfo { record, code_data }
    }
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    log::error!("Archive error: {}", e);
    AppError::StorageError(e.to_string())
}

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A resume read from disk, ready to be handed to `RetrievalEngine::add`.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self { Self }

    /// Read every `.txt` file under `data_dir` (recursive, sorted by path).
    /// Files that are empty after trimming are skipped.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<ResumeFile>> {
        self.process_files(data_dir, self.list_txt_files(data_dir))
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<ResumeFile>> {
        let mut files = self.list_txt_files(data_dir);
        if files.len() > limit { files.truncate(limit); info!(limit, "limited to first files"); }
        self.process_files(data_dir, files)
    }

    fn process_files(&self, data_dir: &Path, files: Vec<PathBuf>) -> Result<Vec<ResumeFile>> {
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let total = files.len();
        let mut resumes = Vec::with_capacity(total);
        for (file_index, file_path) in files.into_iter().enumerate() {
            debug!(file = %file_path.display(), "reading {}/{}", file_index + 1, total);
            let content = self.read_file_content(&file_path)?;
            if content.trim().is_empty() {
                warn!(file = %file_path.display(), "skipping empty file");
                continue;
            }
            let filename = file_name_of(&file_path);
            resumes.push(ResumeFile { filename, path: file_path, content });
        }
        info!(files = total, resumes = resumes.len(), "processed resume directory");
        Ok(resumes)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => {
                let bytes = fs::read(file_path).with_context(|| format!("reading {}", file_path.display()))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
        }
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort(); txt_files
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| path.to_string_lossy().to_string())
}

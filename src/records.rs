use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_json::Value;

const RECORD_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

pub fn collect_record_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && has_record_extension(path) {
            files.push(path.to_path_buf());
        }
    }

    files
}

pub fn read_paths_from_stdin() -> Vec<PathBuf> {
    let stdin = io::stdin();
    stdin
        .lock()
        .lines()
        .map_while(Result::ok)
        .filter(|line| !line.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Load a record file as a JSON value. Unreadable or malformed files are
/// logged and skipped.
pub fn load_record(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("skipping {}: {}", path.display(), err);
            return None;
        }
    };
    match parse_record(&content, is_json(path)) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("skipping {}: {}", path.display(), err);
            None
        }
    }
}

pub fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

fn has_record_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| RECORD_EXTENSIONS.contains(&ext))
}

fn parse_record(content: &str, json: bool) -> Result<Value, String> {
    if json {
        serde_json::from_str(content).map_err(|err| err.to_string())
    } else {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|err| err.to_string())?;
        serde_json::to_value(yaml).map_err(|err| err.to_string())
    }
}

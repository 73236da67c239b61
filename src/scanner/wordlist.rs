use std::path::Path;

use crate::error::{Result, ScanError};

pub async fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::WordlistNotFound(path.display().to_string()));
        }
        Err(source) => {
            return Err(ScanError::Wordlist {
                path: path.display().to_string(),
                source,
            });
        }
    };

    Ok(parse_wordlist(&String::from_utf8_lossy(&bytes)))
}

pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('/'))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

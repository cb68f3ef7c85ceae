use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use url::Url;

/// Reads a URL list: one per line, keeping only `http://` and `https://` entries.
pub fn load_urls<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Input(format!("File not found: {}", path.display())));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_urls(&content))
}

pub fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// Turns a URL into a flat file stem: `host_with_underscores[_path_parts]`.
pub fn sanitize_filename(url: &str) -> String {
    let (host, path) = match Url::parse(url) {
        Ok(parsed) => {
            let mut host = parsed.host_str().unwrap_or_default().to_string();
            if let Some(port) = parsed.port() {
                host.push_str(&format!(":{}", port));
            }
            (host, parsed.path().to_string())
        }
        Err(_) => (String::new(), url.to_string()),
    };

    let domain = host.replace('.', "_");
    let path = path.trim_matches('/').replace('/', "_");

    let name = match (domain.is_empty(), path.is_empty()) {
        (false, false) => format!("{}_{}", domain, path),
        (false, true) => domain,
        (true, false) => path,
        (true, true) => "index".to_string(),
    };

    name.chars()
        .map(|c| if matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect()
}

use regex::Regex;
use tracing::debug;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Resolves the signed batch `proposeBatch` should submit.
///
/// `name` is either a path under `cwd`, used as-is, or a file name inside
/// `signatures_dir` without the `.json` extension. Names may contain `*` and `?`
/// wildcards; names without wildcards that match no file exactly are treated as a
/// prefix. Exactly one file has to match.
pub fn resolve_signed_batch(signatures_dir: &Path, cwd: &Path, name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    if path.is_absolute() && path.starts_with(cwd) {
        if !path.is_file() {
            return Err(Error::NotFound(format!("Expected 1 file, got 0 for {name}")));
        }
        return Ok(path.to_path_buf());
    }

    let stem = name.strip_suffix(".json").unwrap_or(name);
    let files = json_files(signatures_dir)?;

    let matches = if stem.contains(['*', '?']) {
        let pattern = wildcard_regex(stem)?;
        files.into_iter().filter(|(file, _)| pattern.is_match(file)).collect::<Vec<_>>()
    } else {
        let exact = format!("{stem}.json");
        match files.iter().find(|(file, _)| *file == exact) {
            Some(found) => vec![found.clone()],
            None => files.into_iter().filter(|(file, _)| file.starts_with(stem)).collect(),
        }
    };

    let pattern = format!("{}/{stem}.json", signatures_dir.display());
    match matches.as_slice() {
        [] => Err(Error::NotFound(format!("Expected 1 file, got 0 for {pattern}"))),
        [(_, path)] => {
            debug!(path = %path.display(), "Resolved signed batch");
            Ok(path.clone())
        }
        _ => Err(Error::AmbiguousMatch { pattern, count: matches.len() }),
    }
}

fn json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            files.push((name, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

/// Translates a `*` / `?` wildcard file name into an anchored regex over `<name>.json`.
fn wildcard_regex(stem: &str) -> Result<Regex> {
    let mut pattern = String::from("^");
    for c in stem.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push_str(r"\.json$");

    Regex::new(&pattern).map_err(|e| Error::Configuration(format!("Invalid file pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup(files: &[&str]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let sign = dir.path().join("temp/sign");
        fs::create_dir_all(&sign).unwrap();
        for file in files {
            fs::write(sign.join(file), "{}").unwrap();
        }
        dir
    }

    #[test]
    fn exact_name_wins_over_prefix() {
        let dir = setup(&["100-1-signed-batch.json", "100-1-signed-batch-old.json"]);
        let sign = dir.path().join("temp/sign");

        let path = resolve_signed_batch(&sign, dir.path(), "100-1-signed-batch").unwrap();
        assert_eq!(path, sign.join("100-1-signed-batch.json"));
    }

    #[test]
    fn unique_prefix_resolves() {
        let dir = setup(&["100-1-signed-batch.json", "200-1-signed-batch.json"]);
        let sign = dir.path().join("temp/sign");

        let path = resolve_signed_batch(&sign, dir.path(), "200").unwrap();
        assert_eq!(path, sign.join("200-1-signed-batch.json"));
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        let dir = setup(&["100-1-signed-batch.json", "100-10-signed-batch.json"]);
        let sign = dir.path().join("temp/sign");

        let err = resolve_signed_batch(&sign, dir.path(), "100-1").unwrap_err();
        assert!(matches!(err, Error::AmbiguousMatch { count: 2, .. }));
    }

    #[test]
    fn wildcards_must_match_exactly_one_file() {
        let dir = setup(&["100-1-signed-batch.json", "200-1-signed-batch.json"]);
        let sign = dir.path().join("temp/sign");

        assert!(matches!(
            resolve_signed_batch(&sign, dir.path(), "*-1-signed-batch"),
            Err(Error::AmbiguousMatch { count: 2, .. })
        ));
        assert_eq!(
            resolve_signed_batch(&sign, dir.path(), "1??-1-signed-batch").unwrap(),
            sign.join("100-1-signed-batch.json")
        );
    }

    #[test]
    fn missing_files_are_not_found() {
        let dir = setup(&[]);
        let sign = dir.path().join("temp/sign");

        assert!(matches!(
            resolve_signed_batch(&sign, dir.path(), "100"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            resolve_signed_batch(&dir.path().join("missing"), dir.path(), "100"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn paths_under_the_working_directory_are_used_as_is() {
        let dir = setup(&["100-1-signed-batch.json"]);
        let file = dir.path().join("temp/sign/100-1-signed-batch.json");

        let path =
            resolve_signed_batch(Path::new("/nonexistent"), dir.path(), file.to_str().unwrap())
                .unwrap();
        assert_eq!(path, file);
    }
}

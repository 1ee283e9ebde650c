use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;

fn sanitize_relative_file_name(name: &str) -> anyhow::Result<PathBuf> {
    if Path::new(name).is_absolute() {
        anyhow::bail!("report file name must be relative: {name}");
    }

    let mut clean = PathBuf::new();
    for c in Path::new(name).components() {
        match c {
            Component::CurDir => {}
            Component::Normal(p) => clean.push(p),
            // Forbid parent traversal and any absolute/prefix/root components.
            _ => anyhow::bail!("report file name must not traverse directories: {name}"),
        }
    }

    if clean.as_os_str().is_empty() {
        anyhow::bail!("report file name must not be empty");
    }

    Ok(clean)
}

/// Writes the rendered report under `base_dir`, creating the directory if
/// needed, and returns the full path.
pub fn write_report_file(base_dir: &Path, file_name: &str, content: &str) -> anyhow::Result<PathBuf> {
    let rel = sanitize_relative_file_name(file_name)?;
    let path = base_dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report dir: {}", parent.display()))?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write report: {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_absolute_and_traversing_names() {
        assert!(sanitize_relative_file_name("/etc/passwd").is_err());
        assert!(sanitize_relative_file_name("../escape.txt").is_err());
        assert!(sanitize_relative_file_name("").is_err());
    }

    #[test]
    fn writes_into_the_base_dir() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };

        let path = match write_report_file(dir.path(), "report-test.txt", "hello") {
            Ok(p) => p,
            Err(err) => panic!("write failed: {err}"),
        };

        assert!(path.starts_with(dir.path()));
        let read = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => panic!("read back failed: {err}"),
        };
        assert_eq!(read, "hello");
    }
}

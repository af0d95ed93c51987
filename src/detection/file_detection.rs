//! File-based probes.
//!
//! Every probe is relative to the project root. A missing path is "no data",
//! never an error; only paths that exist but cannot be read surface as
//! [`DockerfileError::Io`](crate::error::DockerfileError::Io).

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Check if a file or directory exists relative to project root.
pub fn file_exists(project_root: &Path, file: &str) -> bool {
    project_root.join(file).exists()
}

/// Check if a directory exists relative to project root.
pub fn dir_exists(project_root: &Path, dir: &str) -> bool {
    project_root.join(dir).is_dir()
}

/// Return the first of `files` that exists.
pub fn any_file_exists(project_root: &Path, files: &[&str]) -> Option<String> {
    files
        .iter()
        .find(|f| project_root.join(f).exists())
        .map(|f| f.to_string())
}

/// Read a file if it exists.
///
/// Returns `Ok(None)` when the file is absent or is a directory.
pub fn read_optional(project_root: &Path, file: &str) -> Result<Option<String>> {
    let path = project_root.join(file);
    if !path.is_file() {
        return Ok(None);
    }

    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Check whether any line of an existing file satisfies `predicate`.
///
/// Invalid UTF-8 is replaced rather than rejected. Missing or unreadable
/// files count as "no match".
pub fn file_has_line<F>(project_root: &Path, file: &str, predicate: F) -> bool
where
    F: Fn(&str) -> bool,
{
    let path = project_root.join(file);
    if !path.is_file() {
        return false;
    }

    match fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).lines().any(predicate),
        Err(_) => false,
    }
}

/// Return the first of `files` containing a line that satisfies `predicate`.
pub fn find_file_with_line<'a, F>(
    project_root: &Path,
    files: &[&'a str],
    predicate: F,
) -> Option<&'a str>
where
    F: Fn(&str) -> bool,
{
    files
        .iter()
        .copied()
        .find(|file| file_has_line(project_root, file, &predicate))
}

/// Case-insensitive keyword scan over the first existing files of a list.
pub fn any_file_mentions(project_root: &Path, files: &[&str], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    find_file_with_line(project_root, files, |line| {
        line.to_lowercase().contains(&keyword)
    })
    .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_exists_helper() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "").unwrap();

        assert!(file_exists(temp.path(), "go.mod"));
        assert!(!file_exists(temp.path(), "main.go"));
    }

    #[test]
    fn dir_exists_ignores_plain_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("public")).unwrap();
        fs::write(temp.path().join("dist"), "").unwrap();

        assert!(dir_exists(temp.path(), "public"));
        assert!(!dir_exists(temp.path(), "dist"));
    }

    #[test]
    fn any_file_exists_returns_first_in_priority_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();

        let found = any_file_exists(temp.path(), &["yarn.lock", "pnpm-lock.yaml"]);
        assert_eq!(found, Some("yarn.lock".to_string()));

        let found = any_file_exists(temp.path(), &["package-lock.json"]);
        assert_eq!(found, None);
    }

    #[test]
    fn read_optional_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_optional(temp.path(), "Gemfile").unwrap().is_none());
    }

    #[test]
    fn read_optional_directory_is_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Gemfile")).unwrap();
        assert!(read_optional(temp.path(), "Gemfile").unwrap().is_none());
    }

    #[test]
    fn read_optional_returns_content() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".nvmrc"), "v20\n").unwrap();
        assert_eq!(
            read_optional(temp.path(), ".nvmrc").unwrap().as_deref(),
            Some("v20\n")
        );
    }

    #[test]
    fn any_file_mentions_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "Django==5.0\n").unwrap();

        assert!(any_file_mentions(
            temp.path(),
            &["requirements.txt", "Pipfile"],
            "django"
        ));
        assert!(!any_file_mentions(
            temp.path(),
            &["requirements.txt", "Pipfile"],
            "fastapi"
        ));
    }

    #[test]
    fn keyword_scan_tolerates_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("requirements.txt"),
            b"# caf\xe9 menu\nfastapi==0.110\n",
        )
        .unwrap();

        assert!(any_file_mentions(temp.path(), &["requirements.txt"], "fastapi"));
    }

    #[test]
    fn find_file_with_line_reports_matching_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pom.xml"), "<groupId>org.acme</groupId>\n").unwrap();
        fs::write(
            temp.path().join("build.gradle"),
            "id 'org.springframework.boot' version '3.2.0'\n",
        )
        .unwrap();

        let found = find_file_with_line(temp.path(), &["pom.xml", "build.gradle"], |l| {
            l.contains("org.springframework.boot")
        });
        assert_eq!(found, Some("build.gradle"));
    }
}

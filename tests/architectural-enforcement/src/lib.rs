//! Architectural Enforcement
//!
//! Source-scanning checks that keep production code in the workspace honest:
//! - No sleep() calls; waiting is done on timers, channels or I/O
//! - No blocking I/O inside async functions
//! - No unwrap()/expect() outside tests
//!
//! The scanners here are shared by the tests in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const SOURCE_DIRS: &[&str] = &["index/core/src", "index/watch/src", "tui/src"];

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// One offending line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The trimmed source line
    pub source: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.source)
    }
}

/// Every `.rs` file under the production source directories
pub fn source_files() -> Vec<PathBuf> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in SOURCE_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }
        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files
}

/// Lines of a file up to its `#[cfg(test)]` module
pub fn production_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .collect()
}

/// The code part of a line, without a trailing `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Check if a line is inside an async function
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.contains("async fn ") {
            return true;
        }

        if (line.starts_with("fn ") || line.starts_with("pub fn ") || line.contains(" fn "))
            && !line.contains("async")
        {
            return false;
        }

        // Stop at module/impl boundaries
        if line.starts_with("mod ") || (line.starts_with("impl") && line.contains('{')) {
            return false;
        }
    }
    false
}

/// Apply `check` to the production lines of every source file
pub fn scan(check: impl Fn(&[&str], usize, &str) -> bool) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for path in source_files() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_lines(&content);

        for (idx, line) in lines.iter().enumerate() {
            if check(&lines, idx, code_part(line)) {
                violations.push(Violation {
                    path: path.strip_prefix(&root).unwrap_or(&path).to_path_buf(),
                    line: idx + 1,
                    source: line.trim().to_string(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n\n#[cfg(test)]\nmod tests {\n    fn b() { x.unwrap(); }\n}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}", ""]);
    }

    #[test]
    fn test_code_part_drops_comment() {
        assert_eq!(code_part("let x = 1; // .unwrap()"), "let x = 1; ");
    }

    #[test]
    fn test_async_detection() {
        let code = vec![
            "    pub async fn refresh(&self) {",
            "        let body = std::fs::read_to_string(path);",
            "    }",
        ];
        assert!(is_in_async_function(&code, 1));

        let code = vec![
            "pub fn load_config() {",
            "    let body = std::fs::read_to_string(path);",
            "}",
        ];
        assert!(!is_in_async_function(&code, 1));
    }

    #[test]
    fn test_source_dirs_exist() {
        let root = workspace_root();
        for dir in SOURCE_DIRS {
            assert!(root.join(dir).is_dir(), "missing source dir {dir}");
        }
        assert!(!source_files().is_empty());
    }
}

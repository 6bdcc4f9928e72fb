//! Static scan of PHP sources for request classes imported from the wrong
//! namespace and for classes used without an import.

use crate::errors::{AppError, AppResult};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static REQUEST_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"use\s+App\\Http\\Requests\\(\w+Request)").unwrap());
static NEW_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"new\s+(\w+)\(").unwrap());
static STATIC_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)::(class|\w+)\(").unwrap());
static USE_STMT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"use\s+([^;]+);").unwrap());

/// Directories searched for the definition of an unimported class.
const CLASS_ROOTS: &[&str] = &[
    "app/Models",
    "app/Http/Controllers",
    "app/Http/Requests",
    "app/Http/Requests/Sakip",
    "app/Services",
    "app/Providers",
];

const KEYWORDS: &[&str] = &["self", "static", "parent", "array", "string", "int", "bool"];

const BUILT_IN: &[&str] = &[
    "Exception",
    "Throwable",
    "DateTime",
    "DateTimeImmutable",
    "stdClass",
    "Closure",
    "Generator",
    "PDO",
    "PDOStatement",
    "DOMDocument",
    "SimpleXMLElement",
    "ArrayObject",
    "SplFileInfo",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    WrongNamespace { current: String, suggested: String },
    MissingImport { suggestions: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassIssue {
    pub file: PathBuf,
    pub line: usize,
    pub class: String,
    pub content: String,
    pub kind: IssueKind,
}

pub struct ClassChecker {
    root: PathBuf,
    /// file stem → namespaces defining it
    index: BTreeMap<String, Vec<String>>,
}

impl ClassChecker {
    pub fn new(root: &Path) -> AppResult<Self> {
        let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for dir in CLASS_ROOTS {
            let full = root.join(dir);
            if !full.is_dir() {
                continue;
            }
            for file in php_files(&full)? {
                let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let ns = path_to_namespace(file.strip_prefix(root).unwrap_or(&file));
                let entry = index.entry(stem.to_string()).or_default();
                if !entry.contains(&ns) {
                    entry.push(ns);
                }
            }
        }
        Ok(Self {
            root: root.to_path_buf(),
            index,
        })
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Scan every `.php` file under `root/rel_path`.
    pub fn scan(&self, rel_path: &str) -> AppResult<Vec<ClassIssue>> {
        let base = self.root.join(rel_path);
        if !base.exists() {
            return Err(AppError::Validation(format!("Path does not exist: {rel_path}")));
        }

        let files = if base.is_file() {
            vec![base]
        } else {
            php_files(&base)?
        };

        let mut issues = Vec::new();
        for file in files {
            let content = fs::read_to_string(&file)?;
            issues.extend(self.check_file(&file, &content));
        }
        Ok(issues)
    }

    fn check_file(&self, file: &Path, content: &str) -> Vec<ClassIssue> {
        let uses = use_statements(content);
        let mut issues = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            if let Some(caps) = REQUEST_IMPORT.captures(line) {
                let class = caps[1].to_string();
                let requests = self.root.join("app/Http/Requests");
                if !requests.join(format!("{class}.php")).exists()
                    && requests.join("Sakip").join(format!("{class}.php")).exists()
                {
                    issues.push(ClassIssue {
                        file: file.to_path_buf(),
                        line: idx + 1,
                        class: class.clone(),
                        content: line.trim().to_string(),
                        kind: IssueKind::WrongNamespace {
                            current: format!("App\\Http\\Requests\\{class}"),
                            suggested: format!("App\\Http\\Requests\\Sakip\\{class}"),
                        },
                    });
                }
            }

            let used = NEW_CALL
                .captures(line)
                .or_else(|| STATIC_CALL.captures(line))
                .map(|c| c[1].to_string());
            let Some(class) = used else { continue };
            if KEYWORDS.contains(&class.as_str()) || BUILT_IN.contains(&class.as_str()) {
                continue;
            }

            let imported = uses
                .iter()
                .any(|u| u == &class || u.ends_with(&format!("\\{class}")));
            if imported {
                continue;
            }

            if let Some(suggestions) = self.index.get(&class) {
                issues.push(ClassIssue {
                    file: file.to_path_buf(),
                    line: idx + 1,
                    class,
                    content: line.trim().to_string(),
                    kind: IssueKind::MissingImport {
                        suggestions: suggestions.clone(),
                    },
                });
            }
        }
        issues
    }

    /// Rewrite wrong request namespaces in place. Returns the files touched.
    pub fn fix(&self, issues: &[ClassIssue]) -> AppResult<Vec<PathBuf>> {
        let mut fixed = Vec::new();
        for issue in issues {
            let IssueKind::WrongNamespace { current, suggested } = &issue.kind else {
                continue;
            };
            let content = fs::read_to_string(&issue.file)?;
            fs::write(&issue.file, content.replace(current, suggested))?;
            fixed.push(issue.file.clone());
        }
        Ok(fixed)
    }
}

/// Imported names; `Foo as Bar` keeps `Foo`.
fn use_statements(content: &str) -> Vec<String> {
    USE_STMT
        .captures_iter(content)
        .map(|c| {
            let stmt = &c[1];
            match stmt.split_once(" as ") {
                Some((name, _)) => name.trim().to_string(),
                None => stmt.trim().to_string(),
            }
        })
        .collect()
}

/// `app/Models/Program.php` → `App\Models\Program`
fn path_to_namespace(rel: &Path) -> String {
    let s = rel.to_string_lossy().replace(".php", "").replace(['/', '\\'], "\\");
    match s.strip_prefix("app\\") {
        Some(rest) => format!("App\\{rest}"),
        None => s,
    }
}

/// `.php` files under `dir`, sorted per directory. Symlinks are not followed.
fn php_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "php") {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("sakip-classes-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let write = |rel: &str, body: &str| {
            let p = root.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, body).unwrap();
        };

        write(
            "app/Http/Requests/Sakip/StoreProgramRequest.php",
            "<?php\nnamespace App\\Http\\Requests\\Sakip;\nclass StoreProgramRequest {}\n",
        );
        write("app/Models/Program.php", "<?php\nnamespace App\\Models;\nclass Program {}\n");
        write(
            "app/Http/Controllers/ProgramController.php",
            "<?php\n\
             namespace App\\Http\\Controllers;\n\
             use App\\Http\\Requests\\StoreProgramRequest;\n\
             class ProgramController {\n\
                 public function store(StoreProgramRequest $r) {\n\
                     $p = Program::create($r->all());\n\
                     throw new Exception('x');\n\
                 }\n\
             }\n",
        );
        root
    }

    #[test]
    fn finds_wrong_namespace_and_missing_import() {
        let root = project("scan");
        let checker = ClassChecker::new(&root).unwrap();
        let issues = checker.scan("app").unwrap();

        assert_eq!(issues.len(), 2, "{issues:?}");
        assert_eq!(issues[0].line, 3);
        assert!(matches!(issues[0].kind, IssueKind::WrongNamespace { .. }));
        assert_eq!(issues[1].class, "Program");
        assert_eq!(
            issues[1].kind,
            IssueKind::MissingImport {
                suggestions: vec!["App\\Models\\Program".into()]
            }
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn fix_rewrites_the_import() {
        let root = project("fix");
        let checker = ClassChecker::new(&root).unwrap();
        let issues = checker.scan("app/Http/Controllers").unwrap();
        assert_eq!(checker.fix(&issues).unwrap().len(), 1);

        let body = fs::read_to_string(root.join("app/Http/Controllers/ProgramController.php")).unwrap();
        assert!(body.contains("use App\\Http\\Requests\\Sakip\\StoreProgramRequest;"));
        assert!(
            checker
                .scan("app")
                .unwrap()
                .iter()
                .all(|i| !matches!(i.kind, IssueKind::WrongNamespace { .. }))
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_are_not_followed() {
        let root = project("loop");
        std::os::unix::fs::symlink("..", root.join("app/Http/Controllers/loop")).unwrap();

        let checker = ClassChecker::new(&root).unwrap();
        let issues = checker.scan("app/Http/Controllers").unwrap();
        assert_eq!(issues.len(), 2, "{issues:?}");
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_path_is_reported() {
        let checker = ClassChecker::new(Path::new("/nonexistent-sakip")).unwrap();
        assert_eq!(
            checker.scan("app").unwrap_err().to_string(),
            "Path does not exist: app"
        );
    }
}

//! Language detection by file extension
//!
//! Used to record which languages a source bundle contains.

use std::path::Path;

/// (display name, extensions)
const LANGUAGES: &[(&str, &[&str])] = &[
    ("Rust", &["rs"]),
    ("Go", &["go"]),
    ("C", &["c", "h"]),
    ("C++", &["cpp", "cc", "cxx", "hpp", "hh", "hxx"]),
    ("Java", &["java"]),
    ("Kotlin", &["kt", "kts"]),
    ("Scala", &["scala", "sc"]),
    ("TypeScript", &["ts", "mts", "cts", "tsx"]),
    ("JavaScript", &["js", "mjs", "cjs", "jsx"]),
    ("Python", &["py", "pyi"]),
    ("Ruby", &["rb", "rake"]),
    ("PHP", &["php"]),
    ("C#", &["cs"]),
    ("Swift", &["swift"]),
    ("Elixir", &["ex", "exs"]),
    ("Bash", &["sh", "bash", "zsh"]),
    ("SQL", &["sql"]),
];

/// Display name of the language a path is written in, if recognised
pub fn detect_language(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(name, _)| *name)
}

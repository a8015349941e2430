#![allow(dead_code)]

use mvw_core::{CONFIG_FILE, MARKER_DIR, load_config};
use mvw_generator::Generator;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Template that prints navigation in a form tests can pick apart
pub const NAV_TEMPLATE: &str = "title={{ title }}
url={{ url|safe }}
crumbs={% for p in breadcrumb %}{{ p.url|safe }} {% endfor %}
crumb_titles={% for p in breadcrumb %}{{ p.title }}|{% endfor %}
pages={% for p in pages %}{{ p.url|safe }} {% endfor %}
children={% for p in children %}{{ p.url|safe }} {% endfor %}
content={{ content|safe }}";

/// Create a wiki in a temp directory with the given source files.
///
/// `config` is written to `.mvw/mvw.toml`. The navigation template is
/// installed as the default theme template.
pub fn wiki_with_config(files: &[(&str, &str)], config: &str) -> (TempDir, Generator) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join(MARKER_DIR);
    fs::create_dir_all(root.join("theme/template")).unwrap();
    fs::write(root.join("theme/template/default.html"), NAV_TEMPLATE).unwrap();
    fs::write(root.join(CONFIG_FILE), config).unwrap();

    for (name, content) in files {
        write(dir.path(), name, content);
    }

    let generator = Generator::new(load_config(&root).unwrap()).unwrap();
    (dir, generator)
}

pub fn wiki(files: &[(&str, &str)]) -> (TempDir, Generator) {
    wiki_with_config(files, "")
}

pub fn write(base: &Path, name: &str, content: &str) {
    let path = base.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(base: &Path, name: &str) -> String {
    fs::read_to_string(base.join(name)).unwrap()
}

/// Value of a `key=` line from [`NAV_TEMPLATE`] output
pub fn field(html: &str, key: &str) -> String {
    let prefix = format!("{}=", key);
    html.lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .unwrap_or_default()
        .to_string()
}

/// Space separated URL list from a [`NAV_TEMPLATE`] field
pub fn urls(html: &str, key: &str) -> Vec<String> {
    field(html, key)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Relative file paths of a tree
pub fn files(dir: &Path) -> Vec<String> {
    digest(dir).into_keys().collect()
}

/// SHA-256 of every file in a tree, keyed by relative path
pub fn digest(dir: &Path) -> BTreeMap<String, String> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let bytes = fs::read(entry.path()).unwrap();
            (relative, format!("{:x}", Sha256::digest(&bytes)))
        })
        .collect()
}

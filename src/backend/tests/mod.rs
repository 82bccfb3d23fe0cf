
use std::fs;
use std::path::Path;

/// Write a model directory with a descriptor and the given item files
/// (`type-dir/Name.xml`, contents).
pub(super) fn write_model(root: &Path, name: &str, imports: &[&str], items: &[(&str, &str)]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let imports: String = imports
        .iter()
        .map(|i| format!("  <import model=\"{i}\"/>\n"))
        .collect();
    fs::write(
        dir.join("model.xml"),
        format!("<model name=\"{name}\">\n{imports}</model>\n"),
    )
    .unwrap();
    for (relative, contents) in items {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

pub(super) fn process_xml(name: &str) -> String {
    format!("<item name=\"{name}\" type=\"Process\"/>")
}

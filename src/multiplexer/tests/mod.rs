
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::qualifier::Qualifier;

/// Write `<root>/<name>/model.xml` plus one process item per entry of `processes`.
pub(super) fn write_model(root: &Path, name: &str, imports: &[&str], processes: &[&str]) {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("process")).unwrap();
    let imports: String = imports
        .iter()
        .map(|i| format!("  <import model=\"{i}\"/>\n"))
        .collect();
    fs::write(
        dir.join("model.xml"),
        format!("<model name=\"{name}\">\n{imports}</model>\n"),
    )
    .unwrap();
    for process in processes {
        fs::write(
            dir.join("process").join(format!("{process}.xml")),
            format!("<item name=\"{process}\" type=\"Process\"/>"),
        )
        .unwrap();
    }
}

/// A workspace root and a resource root with `bundle/` below it.
pub(super) struct Layout {
    pub workspace: TempDir,
    pub resources: TempDir,
}

impl Layout {
    /// `Sales` (imports `Library`) on disk; `System` and `Library` bundled.
    pub fn sales() -> Self {
        let layout = Self {
            workspace: TempDir::new().unwrap(),
            resources: TempDir::new().unwrap(),
        };
        write_model(layout.workspace.path(), "Sales", &["Library"], &["CheckOrder"]);
        let bundle = layout.resources.path().join("bundle");
        write_model(&bundle, "System", &[], &["Base"]);
        write_model(&bundle, "Library", &[], &["Approve"]);
        layout
    }

    pub fn config(&self) -> RepositoryConfig {
        RepositoryConfig::new(self.workspace.path())
            .with_resource_root(self.resources.path())
            .with_resource_prefix("bundle")
    }

    pub fn multiplexer(&self) -> ModelMultiplexer {
        let mut multiplexer = ModelMultiplexer::from_config(&self.config()).unwrap();
        multiplexer.read_models().unwrap();
        multiplexer
    }
}

pub(super) fn q(text: &str) -> Qualifier {
    Qualifier::parse(text).unwrap()
}

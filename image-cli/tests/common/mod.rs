#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_cli::commands::ImageManager;
use image_cli::mock::ScriptedConsole;
use image_storage::mock::{InMemoryImageStore, InMemoryLabelTable};
use image_storage::LabelRecord;
use tempfile::TempDir;

/// Manager wired to in-memory collaborators and a scratch working directory
pub struct TestContext {
    pub store: Arc<InMemoryImageStore>,
    pub table: Arc<InMemoryLabelTable>,
    pub console: Arc<ScriptedConsole>,
    pub manager: ImageManager,
    pub dir: TempDir,
}

impl TestContext {
    pub fn new(answers: &[&str]) -> Self {
        Self::with_store(InMemoryImageStore::new(), answers)
    }

    pub fn with_store(store: InMemoryImageStore, answers: &[&str]) -> Self {
        let store = Arc::new(store);
        let table = Arc::new(InMemoryLabelTable::new());
        let console = Arc::new(ScriptedConsole::new(answers));
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let manager = ImageManager::new(
            store.clone(),
            table.clone(),
            console.clone(),
            dir.path().to_path_buf(),
        );

        Self {
            store,
            table,
            console,
            manager,
            dir,
        }
    }

    /// Writes a file into the scratch directory
    pub fn local_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write local file");
        path
    }

    pub fn local_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn lines(&self) -> Vec<String> {
        self.console.lines()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.console.prompts()
    }
}

pub fn labeled(image: &str) -> LabelRecord {
    LabelRecord {
        image: image.to_string(),
        e_tag: "0f343b0931126a20f133d67c2b018a3b".to_string(),
        labels: vec![],
    }
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read file")
}

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory for fixture files, removed on drop.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    /// A fresh directory under the system temp dir; safe across parallel tests.
    pub fn unique(prefix: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::new(std::env::temp_dir().join(format!(
            "gemm_analysis_{}_{}_{}",
            prefix,
            std::process::id(),
            id
        )))
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).unwrap();
    }
}

impl AsRef<Path> for TestDir {
    fn as_ref(&self) -> &Path {
        self.path.as_ref()
    }
}

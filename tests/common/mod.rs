#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test helper for creating temporary directories with templates and secret stores
pub struct TestFixture {
    _temp_dir: TempDir,
    pub base_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            base_path,
        }
    }

    /// Writes `content` to `name` inside the fixture directory
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.base_path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Creates a dotenv secret store holding the secrets of a small web app
    ///
    /// Returns the source URI for it.
    pub fn create_secret_store(&self) -> String {
        let store = r#"
# secrets for company/webapp
COMPANY_WEBAPP_PROD_DB_PASSWORD=prod-db-pass
COMPANY_WEBAPP_DEV_DB_PASSWORD=dev-db-pass
COMPANY_WEBAPP_PROD_API_KEY=prod-api-key
"#;
        let path = self.write("store.env", store);
        format!("dotenv://{}", path.display())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

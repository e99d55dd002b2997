use std::fs;
use std::path::{Path, PathBuf};

use jira::{Credentials, Jira};
use mockito::Server;
use tempfile::TempDir;
use worklog::context::Context;
use worklog::ApplicationRuntime;

pub const WORKER: &str = "jdoe";

/// A `$TEMPI_HOME` holding a complete set of configuration tables
pub struct TestHome {
    pub dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        // Initialize logger only once
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().expect("Failed to create temporary home");
        let config = dir.path().join("config");
        fs::create_dir_all(&config).unwrap();
        fs::write(
            config.join("work.json"),
            r#"{
                "ops": {"issue": "OPS-1", "activity": "Development"},
                "mtg": {"issue": "ADM-2", "activity": "Non-Project meeting"},
                "proj": {"issue": "PROJ-100"}
            }"#,
        )
        .unwrap();
        fs::write(
            config.join("activity.json"),
            r#"{
                "Design": "Requirements",
                "Development": "Design",
                "Testing - Pre Deployment": "Development",
                "Non-Project meeting": "Non-Projectmeeting"
            }"#,
        )
        .unwrap();
        fs::write(
            config.join("comment-to-act.json"),
            r#"{
                "same": ["Development", "Design"],
                "map": [
                    ["(?i)test", "Testing - Pre Deployment"],
                    ["(?i)meeting|sync", "Non-Project meeting"],
                    ["(?i)fix|implement", "Development"]
                ]
            }"#,
        )
        .unwrap();
        TestHome { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn context(&self) -> Context {
        Context::new(self.path(), false).with_custom_dir(self.path())
    }

    pub fn write_worklog(&self, name: &str, contents: &str) -> PathBuf {
        let file = self.path().join(name);
        fs::write(&file, contents).unwrap();
        file
    }

    /// Runtime talking to a mock Jira with Tempo
    pub fn runtime(&self, server: &Server) -> ApplicationRuntime {
        let jira = Jira::new(server.url(), Credentials::Bearer("secret".to_string()))
            .expect("Failed to create Jira client");
        ApplicationRuntime::builder()
            .context(self.context())
            .client(jira)
            .build()
            .expect("Failed to create test runtime")
    }
}

use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize tests that modify the process working directory.
/// Changing the directory concurrently can lead to nondeterministic failures.
pub static TEST_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Root of the checked-in example project.
pub fn get_root_dir() -> PathBuf {
    let workspace_root = std::env::var("CARGO_WORKSPACE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .ancestors()
                .nth(2)
                .expect("crate should live under <workspace>/dwh_core/<crate>")
                .to_path_buf()
        });

    workspace_root.join("example/warehouse-project")
}

/// Temporarily change the current working directory for the duration of the closure.
/// Guards against concurrent `chdir` calls by taking the global `TEST_MUTEX` lock.
/// Always restores the original directory, even if the closure panics.
pub fn with_chdir<F, T>(target: impl AsRef<Path>, f: F) -> io::Result<T>
where
    F: FnOnce() -> T,
{
    let _lock = TEST_MUTEX.lock().unwrap();

    let original = env::current_dir()?;
    env::set_current_dir(target.as_ref())?;

    struct Reset(PathBuf);
    impl Drop for Reset {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }
    let _guard = Reset(original);

    Ok(f())
}

pub async fn with_chdir_async<F, Fut, T>(target: impl AsRef<Path>, f: F) -> io::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let _lock = TEST_MUTEX.lock().unwrap();

    let original = env::current_dir()?;
    env::set_current_dir(target.as_ref())?;

    struct Reset(PathBuf);
    impl Drop for Reset {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }
    let _guard = Reset(original);

    Ok(f().await)
}

/// A scaffolded warehouse project in a temp directory, kept alive for the
/// duration of the test.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Write a minimal but complete warehouse project: config, connection
/// profile, and one SQL step per stage.
pub fn create_warehouse_project(name: &str, version: &str) -> io::Result<TestProject> {
    let dir = TempDir::new()?;
    let root = dir.path();

    let project_yaml = format!(
        r#"name: {name}
version: "{version}"
connections:
  profile: dev
  path: connections.yml
cluster:
  identifier: {name}-cluster
  cluster_type: multi-node
  node_type: dc2.large
  node_count: 2
  database: {name}
  admin_username: admin
  admin_password: secret
  port: 5439
  role:
    name: {name}StorageRead
    trust_principal: warehouse.internal
    policy_arns:
      - arn:dwh:policy/ReadOnlyStorage
services:
  identity: {{ host: localhost, port: 8811 }}
  cluster: {{ host: localhost, port: 8812 }}
  network: {{ host: localhost, port: 8813 }}
etl:
  storage:
    role_arn: arn:dwh:identity::role/{name}StorageRead
    log_data: s3://{name}/log_data
  schema:
    - {{ name: staging_events, file: sql/schema/staging_events.sql }}
  load:
    - {{ name: staging_events, file: sql/load/staging_events.sql }}
  transform:
    - {{ name: users, file: sql/transform/users.sql }}
"#
    );
    fs::write(root.join("warehouse-project.yml"), project_yaml)?;

    let connections_yaml = format!(
        r#"dev:
  warehouse:
    adapter: postgres
    host: localhost
    user: admin
    password: secret
    database: {name}
    port: 5439
"#
    );
    fs::write(root.join("connections.yml"), connections_yaml)?;

    for stage in ["schema", "load", "transform"] {
        fs::create_dir_all(root.join("sql").join(stage))?;
    }
    fs::write(
        root.join("sql/schema/staging_events.sql"),
        "DROP TABLE IF EXISTS staging_events;\nCREATE TABLE staging_events (event_id INT);\n",
    )?;
    fs::write(
        root.join("sql/load/staging_events.sql"),
        "COPY staging_events FROM '{{ storage.log_data }}' IAM_ROLE '{{ role_arn }}';\n",
    )?;
    fs::write(
        root.join("sql/transform/users.sql"),
        "INSERT INTO users SELECT DISTINCT user_id FROM staging_events;\n",
    )?;

    Ok(TestProject { dir })
}

//! Screen lock capability

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use futures::future::{BoxFuture, FutureExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// The privileged capability to lock the screen.
///
/// `lock` is only meaningful while `is_authorized` is true; implementations
/// treat it as a no-op otherwise.
pub trait ScreenLock: Send + Sync {
    fn is_authorized(&self) -> bool;

    fn lock(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Locks the screen by running an external command such as
/// `loginctl lock-session`.
#[derive(Debug)]
pub struct CommandScreenLock {
    program: Option<String>,
    args: Vec<String>,
    authorized: AtomicBool,
}

impl CommandScreenLock {
    /// Build from a whitespace separated command line. An empty line gives a
    /// lock that can never be authorized.
    pub fn from_command_line(line: &str) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next();
        Self {
            program,
            args: parts.collect(),
            authorized: AtomicBool::new(false),
        }
    }

    pub fn command_line(&self) -> Option<String> {
        self.program.as_ref().map(|program| {
            std::iter::once(program.as_str())
                .chain(self.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Grant authorization if the lock program resolves to an executable
    /// file. The program is never run here. Returns the resulting
    /// authorization.
    pub fn probe(&self) -> bool {
        let Some(program) = &self.program else {
            info!("No screen lock command configured, locking disabled");
            self.authorized.store(false, Ordering::SeqCst);
            return false;
        };

        let available = match resolve_program(program) {
            Some(path) => {
                info!("Screen lock program found at {:?}", path);
                true
            }
            None => {
                warn!("Screen lock program {} not found, locking disabled", program);
                false
            }
        };
        self.authorized.store(available, Ordering::SeqCst);
        available
    }

    /// Grant authorization without probing.
    pub fn grant(&self) {
        if self.program.is_some() {
            self.authorized.store(true, Ordering::SeqCst);
        }
    }

    async fn run(&self) -> Result<(), String> {
        let Some(program) = &self.program else {
            return Ok(());
        };
        if !self.is_authorized() {
            debug!("Screen lock not authorized, skipping");
            return Ok(());
        }

        info!("Executing screen lock");
        let output = Command::new(program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} failed: {}", program, stderr.trim()));
        }

        info!("Screen lock command executed");
        Ok(())
    }
}

/// Locate `program` the way a shell would: paths are checked as given,
/// bare names are searched on `PATH`.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

impl ScreenLock for CommandScreenLock {
    fn is_authorized(&self) -> bool {
        self.program.is_some() && self.authorized.load(Ordering::SeqCst)
    }

    fn lock(&self) -> BoxFuture<'_, Result<(), String>> {
        self.run().boxed()
    }
}

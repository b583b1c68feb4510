//! Host system facts: service status, uptime and kernel version

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::SourceError;

/// Appliance daemons managed by supervisord rather than systemd
const SUPERVISED_PROGRAMS: &[&str] = &[
    "replication",
    "data-collector",
    "service-monitor",
    "task-scheduler",
];

/// Raw result of a host command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Access to facts about the host the server runs on
#[async_trait]
pub trait HostFacts: Send + Sync {
    /// Query the status of a named service; code 0 means running
    async fn service_status(&self, service: &str) -> Result<CommandOutput, SourceError>;

    /// Seconds since boot
    async fn uptime(&self) -> Result<u64, SourceError>;

    /// Running kernel release, e.g. `4.12.4-1.el7.elrepo.x86_64`
    async fn kernel_version(&self) -> Result<String, SourceError>;
}

/// [`HostFacts`] backed by the local system
#[derive(Debug, Clone)]
pub struct SystemHost {
    proc_uptime: PathBuf,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            proc_uptime: PathBuf::from("/proc/uptime"),
        }
    }

    /// Read uptime from a different file (for testing)
    pub fn with_proc_uptime(path: impl Into<PathBuf>) -> Self {
        Self {
            proc_uptime: path.into(),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostFacts for SystemHost {
    async fn service_status(&self, service: &str) -> Result<CommandOutput, SourceError> {
        let (program, args) = status_command(service);
        run_command(program, &args).await
    }

    async fn uptime(&self) -> Result<u64, SourceError> {
        let contents = tokio::fs::read_to_string(&self.proc_uptime)
            .await
            .map_err(|e| SourceError::CommandSpawn {
                command: format!("read {}", self.proc_uptime.display()),
                source: e,
            })?;
        parse_proc_uptime(&contents)
    }

    async fn kernel_version(&self) -> Result<String, SourceError> {
        let output = run_command("uname", &["-r"]).await?;
        if !output.success() {
            return Err(SourceError::CommandFailed {
                command: "uname -r".to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

/// Pick the status command for a service name
fn status_command(service: &str) -> (&'static str, Vec<&str>) {
    if SUPERVISED_PROGRAMS.contains(&service) {
        ("supervisorctl", vec!["status", service])
    } else {
        ("systemctl", vec!["status", systemd_unit(service)])
    }
}

/// Map a service name to its systemd unit
fn systemd_unit(service: &str) -> &str {
    match service {
        "nfs" => "nfs-server",
        "nis" => "ypbind",
        "ldap" => "nslcd",
        "sftp" => "sshd",
        other => other,
    }
}

async fn run_command(program: &str, args: &[&str]) -> Result<CommandOutput, SourceError> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SourceError::CommandSpawn {
            command: format!("{} {}", program, args.join(" ")),
            source: e,
        })?;

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Parse the first field of `/proc/uptime` ("12345.67 54321.00") into whole seconds
pub fn parse_proc_uptime(contents: &str) -> Result<u64, SourceError> {
    let first = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| SourceError::Parse {
            what: "uptime",
            message: "empty input".to_string(),
        })?;

    let secs: f64 = first.parse().map_err(|e: std::num::ParseFloatError| SourceError::Parse {
        what: "uptime",
        message: e.to_string(),
    })?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(SourceError::Parse {
            what: "uptime",
            message: format!("out of range: {}", first),
        });
    }

    Ok(secs as u64)
}

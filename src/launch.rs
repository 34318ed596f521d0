use std::path::Path;
use std::process::Command;
use std::process::Stdio;

use crate::error::LaunchError;

/// Something that can show a file to the user.
pub trait Launcher {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

/// Opens files through the host's "open with" facility.
///
/// With no `app` the host's default handler for the file type is used.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    pub app: Option<String>,
}

impl SystemLauncher {
    pub fn new(app: Option<String>) -> Self {
        Self { app }
    }

    fn command(&self, path: &Path) -> (Command, bool) {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            if let Some(app) = &self.app {
                cmd.arg("-a").arg(app);
            }
            cmd.arg(path);
            (cmd, true)
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            // empty title, otherwise `start` eats the first quoted arg
            cmd.args(["/C", "start", ""]);
            if let Some(app) = &self.app {
                cmd.arg(app);
            }
            cmd.arg(path);
            (cmd, true)
        } else {
            match &self.app {
                Some(app) => {
                    let mut cmd = Command::new(app);
                    cmd.arg(path);
                    (cmd, false)
                }
                None => {
                    let mut cmd = Command::new("xdg-open");
                    cmd.arg(path);
                    (cmd, true)
                }
            }
        }
    }
}

impl Launcher for SystemLauncher {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        let (cmd, wait) = self.command(path);
        dispatch(cmd, wait)
    }
}

/// Handler commands (`open`, `start`, `xdg-open`) return as soon as the
/// request is dispatched and are waited on. An application spawned directly
/// is left running.
fn dispatch(mut cmd: Command, wait: bool) -> Result<(), LaunchError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    log::debug!("launching {cmd:?}");
    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !wait {
        return Ok(());
    }

    let status = child.wait().map_err(|source| LaunchError::Spawn {
        program: program.clone(),
        source,
    })?;
    if !status.success() {
        return Err(LaunchError::Status { program, status });
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn failing_handler_is_a_status_error() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        let err = dispatch(cmd, true).unwrap_err();
        match err {
            LaunchError::Status { program, status } => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detached_app_status_is_not_checked() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        dispatch(cmd, false).unwrap();
    }

    #[test]
    fn missing_app_is_a_spawn_error() {
        let cmd = Command::new("jsonpeek-no-such-viewer");
        let err = dispatch(cmd, false).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }), "{err:?}");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn named_app_is_spawned_directly() {
        let launcher = SystemLauncher::new(Some("true".to_owned()));
        let (cmd, wait) = launcher.command(Path::new("/tmp/x.json"));
        assert_eq!(cmd.get_program(), "true");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), ["/tmp/x.json"]);
        assert!(!wait);
        launcher.open(Path::new("/tmp/x.json")).unwrap();
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn default_handler_is_xdg_open() {
        let launcher = SystemLauncher::default();
        let (cmd, wait) = launcher.command(Path::new("/tmp/x.json"));
        assert_eq!(cmd.get_program(), "xdg-open");
        assert!(wait);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn named_app_goes_through_open() {
        let launcher = SystemLauncher::new(Some("Firefox".to_owned()));
        let (cmd, wait) = launcher.command(Path::new("/tmp/x.json"));
        assert_eq!(cmd.get_program(), "open");
        assert_eq!(
            cmd.get_args().collect::<Vec<_>>(),
            ["-a", "Firefox", "/tmp/x.json"]
        );
        assert!(wait);
    }
}

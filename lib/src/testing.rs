//! Fakes shared by unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::orchestrate::Launcher;
use crate::probe::Probe;

/// Answers every probe the same way and remembers what was asked.
#[derive(Debug, Default)]
pub struct FixedProbe {
    answer: bool,
    calls: Mutex<Vec<(String, u16)>>,
}

impl FixedProbe {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, u16)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Probe for FixedProbe {
    async fn probe(&self, host: &str, port: u16) -> bool {
        self.calls.lock().unwrap().push((host.to_owned(), port));
        self.answer
    }
}

/// A script file seen by [`RecordingLauncher`] while it was being run.
#[derive(Debug, Clone)]
pub struct SeenScript {
    pub path: String,
    pub contents: String,
    #[cfg(unix)]
    pub mode: u32,
}

/// Records launched commands and replies with queued exit codes (0 once the
/// queue runs dry).
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    exit_codes: Mutex<VecDeque<i32>>,
    launched: Mutex<Vec<Vec<String>>>,
    scripts: Mutex<Vec<SeenScript>>,
}

impl RecordingLauncher {
    pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: Mutex::new(codes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<Vec<String>> {
        self.launched.lock().unwrap().clone()
    }

    pub fn scripts(&self) -> Vec<SeenScript> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn launch(&self, argv: &[String]) -> Result<i32> {
        self.launched.lock().unwrap().push(argv.to_vec());

        if let [path] = argv {
            let file = Path::new(path);
            if file.is_file() {
                let contents = std::fs::read_to_string(file)?;
                #[cfg(unix)]
                let mode = {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::metadata(file)?.permissions().mode() & 0o777
                };
                self.scripts.lock().unwrap().push(SeenScript {
                    path: path.clone(),
                    contents,
                    #[cfg(unix)]
                    mode,
                });
            }
        }

        Ok(self.exit_codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}

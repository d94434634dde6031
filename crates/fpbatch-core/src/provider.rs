//! Fingerprint providers
//!
//! The extractor only sees the `FingerprintProvider` trait. `FpcalcProvider`
//! runs Chromaprint's `fpcalc` as a subprocess; tests plug in fakes.

use crate::config::ExtractorConfig;
use crate::error::DecodeError;
use fpbatch_record::FingerprintPayload;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Computes the fingerprint payload of one audio file
pub trait FingerprintProvider {
    fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintPayload, DecodeError>;
}

impl<P: FingerprintProvider + ?Sized> FingerprintProvider for &P {
    fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintPayload, DecodeError> {
        (**self).fingerprint(audio_path)
    }
}

impl<P: FingerprintProvider + ?Sized> FingerprintProvider for Box<P> {
    fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintPayload, DecodeError> {
        (**self).fingerprint(audio_path)
    }
}

/// Runs `fpcalc [args...] <audio_path>` and parses its `KEY=VALUE` output
#[derive(Debug, Clone)]
pub struct FpcalcProvider {
    binary: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl FpcalcProvider {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.fpcalc_path.clone())
            .with_args(config.fpcalc_args.clone())
            .with_timeout(config.timeout())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Check whether the binary can be started at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn command(&self, audio_path: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(&self.args).arg(audio_path).stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, e: io::Error) -> DecodeError {
        match e.kind() {
            io::ErrorKind::NotFound => DecodeError::ToolNotFound(self.binary.clone()),
            _ => DecodeError::Io(e),
        }
    }

    fn run(&self, audio_path: &Path) -> Result<Output, DecodeError> {
        let mut command = self.command(audio_path);
        match self.timeout {
            None => command.output().map_err(|e| self.spawn_error(e)),
            Some(timeout) => {
                let child = command
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(|e| self.spawn_error(e))?;
                wait_with_timeout(child, timeout)
            }
        }
    }
}

impl FingerprintProvider for FpcalcProvider {
    fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintPayload, DecodeError> {
        if !audio_path.is_file() {
            return Err(DecodeError::FileNotFound(audio_path.display().to_string()));
        }

        log::debug!("Running {} on {}", self.binary, audio_path.display());
        let output = self.run(audio_path)?;

        if !output.status.success() {
            return Err(DecodeError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let payload = FingerprintPayload::parse_fpcalc_output(&String::from_utf8_lossy(&output.stdout));
        if let Some(field) = payload.missing_required() {
            return Err(DecodeError::MissingField(field));
        }

        Ok(payload)
    }
}

/// Wait for `child`, killing it once `timeout` has elapsed.
///
/// Pipes are drained on helper threads so a chatty child cannot block on a
/// full pipe while we poll.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<Output, DecodeError> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + timeout;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DecodeError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

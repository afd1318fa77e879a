//! External compressor adapter
//!
//! Runs an LZ11 encoder as a subprocess. Two calling conventions are
//! supported, picked from the argument list:
//!
//! - **File mode**: any argument containing `{input}` (and optionally
//!   `{output}`) gets scratch file paths substituted. Without `{output}` the
//!   tool is expected to compress the input file in place.
//! - **Pipe mode**: otherwise the data goes to stdin and the result is read
//!   from stdout.
//!
//! Every run is bounded by a timeout; a tool that overruns is killed.

use ctr_common::{CodecError, Compressor};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Placeholder replaced by the scratch input path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the scratch output path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Default upper bound for one compressor run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Compressor backed by an external executable.
#[derive(Debug, Clone)]
pub struct ExternalCompressor {
    label: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalCompressor {
    /// Resolve `command` on `PATH` (or as a path) and bind its arguments.
    pub fn new(command: &str, args: Vec<String>, timeout: Duration) -> Result<Self, CodecError> {
        let program = which::which(command).map_err(|e| CodecError::Compression {
            compressor: command.to_string(),
            reason: format!("executable not found: {}", e),
        })?;
        Ok(Self {
            label: command.to_string(),
            program,
            args,
            timeout,
        })
    }

    fn uses_files(&self) -> bool {
        self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER))
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::Compression {
            compressor: self.label.clone(),
            reason: reason.into(),
        }
    }

    fn compress_files(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let scratch = tempfile::tempdir().map_err(|e| self.error(format!("scratch dir: {}", e)))?;
        let input = scratch.path().join("banner.bin");
        let output = scratch.path().join("banner.lz");
        std::fs::write(&input, data).map_err(|e| self.error(format!("write input: {}", e)))?;

        let in_place = !self.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER));
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input.to_string_lossy())
                    .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy())
            })
            .collect();

        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(scratch.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("failed to start {:?}: {}", self.program, e)))?;

        let stderr = drain(child.stderr.take());
        let status = self.wait(&mut child)?;
        let stderr = join_drain(stderr);
        self.check_status(status, &stderr)?;

        let result = if in_place { &input } else { &output };
        std::fs::read(result).map_err(|e| self.error(format!("read output {:?}: {}", result, e)))
    }

    fn compress_pipe(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("failed to start {:?}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.error("stdin not captured"))?;
        let input = data.to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let stdout = join_drain(stdout);
        let stderr = join_drain(stderr);
        let written = writer.join();

        self.check_status(status, &stderr)?;
        // Exiting cleanly after a partial read would yield a truncated model.
        match written {
            Ok(Ok(())) => Ok(stdout),
            Ok(Err(e)) => Err(self.error(format!("compressor did not consume all input: {}", e))),
            Err(_) => Err(self.error("stdin writer thread panicked")),
        }
    }

    /// Poll until exit or timeout; kill on timeout.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, CodecError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.error(format!(
                            "timed out after {:.1}s",
                            self.timeout.as_secs_f64()
                        )));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(self.error(format!("wait failed: {}", e))),
            }
        }
    }

    fn check_status(&self, status: ExitStatus, stderr: &[u8]) -> Result<(), CodecError> {
        if status.success() {
            return Ok(());
        }
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stderr = String::from_utf8_lossy(stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(self.error(format!("exit code {}", code)))
        } else {
            Err(self.error(format!("exit code {}: {}", code, stderr)))
        }
    }
}

impl Compressor for ExternalCompressor {
    fn name(&self) -> &str {
        &self.label
    }

    fn compress(&self, data: &[u8]) -> ctr_common::Result<Vec<u8>> {
        let started = Instant::now();
        let compressed = if self.uses_files() {
            self.compress_files(data)?
        } else {
            self.compress_pipe(data)?
        };
        if compressed.is_empty() {
            return Err(self.error("produced no output"));
        }
        tracing::debug!(
            "{} compressed {} -> {} bytes in {:?}",
            self.label,
            data.len(),
            compressed.len(),
            started.elapsed()
        );
        Ok(compressed)
    }
}

type Drain = Option<thread::JoinHandle<Vec<u8>>>;

/// Read a child stream to the end on a background thread.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Drain {
    stream.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Drain) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_mode() {
        let cat = ExternalCompressor::new("cat", vec![], DEFAULT_TIMEOUT).unwrap();
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(cat.compress(&data).unwrap(), data);
        assert_eq!(cat.name(), "cat");
    }

    #[test]
    fn test_file_mode_with_output() {
        let cp = ExternalCompressor::new(
            "cp",
            vec![INPUT_PLACEHOLDER.into(), OUTPUT_PLACEHOLDER.into()],
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(cp.compress(b"model").unwrap(), b"model");
    }

    #[test]
    fn test_file_mode_in_place() {
        let touch = ExternalCompressor::new(
            "touch",
            vec![INPUT_PLACEHOLDER.into()],
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(touch.compress(b"unchanged").unwrap(), b"unchanged");
    }

    #[test]
    fn test_missing_executable() {
        let err = ExternalCompressor::new("no-such-lz11-tool", vec![], DEFAULT_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, CodecError::Compression { .. }));
    }

    #[test]
    fn test_nonzero_exit() {
        let fail = ExternalCompressor::new("false", vec![], DEFAULT_TIMEOUT).unwrap();
        let err = fail.compress(b"data").unwrap_err();
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let sleep =
            ExternalCompressor::new("sleep", vec!["5".into()], Duration::from_millis(100)).unwrap();
        let started = Instant::now();
        let err = sleep.compress(b"data").unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_empty_output_is_error() {
        let discard = ExternalCompressor::new(
            "sh",
            vec!["-c".into(), "cat > /dev/null".into()],
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        let err = discard.compress(b"data").unwrap_err();
        assert!(err.to_string().contains("no output"));
    }

    #[test]
    fn test_partial_read_is_error() {
        // Exits 0 after 16 bytes; 1 MiB cannot sit in the pipe buffer.
        let head = ExternalCompressor::new("head", vec!["-c".into(), "16".into()], DEFAULT_TIMEOUT)
            .unwrap();
        let data = vec![0x5A; 1 << 20];
        let err = head.compress(&data).unwrap_err();
        assert!(matches!(err, CodecError::Compression { .. }));
        assert!(err.to_string().contains("did not consume all input"));
    }
}

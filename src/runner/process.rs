//! Subprocess execution with a deadline
//!
//! stdout and stderr are drained on their own threads so a chatty compiler
//! cannot deadlock on a full pipe while we poll for exit. Readers append chunks
//! to a shared buffer, so whatever arrived before a kill is kept even when a
//! grandchild still holds the pipe open.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code recorded for a run that hit its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const DRAIN_AFTER_EXIT: Duration = Duration::from_secs(2);
const DRAIN_AFTER_KILL: Duration = Duration::from_millis(250);
const READ_CHUNK: usize = 8192;

/// Raw outcome of a timed process run.
#[derive(Debug)]
pub(crate) struct TimedOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

/// Spawn `cmd` and wait at most `timeout` for it; kill it on expiry.
///
/// On Unix the child leads its own process group and the whole group is
/// killed, so helpers it forked (`cc1`, `ld`, ...) do not outlive the run.
pub(crate) fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<TimedOutput> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let start = Instant::now();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = Capture::start(child.stdout.take());
    let stderr = Capture::start(child.stderr.take());

    let (exit_code, timed_out) = match wait_for_child(&mut child, timeout)? {
        Some(status) => (exit_code_of(status), false),
        None => {
            kill_process_group(&child);
            // Already-exited races are fine; wait() below reaps either way.
            let _ = child.kill();
            child.wait()?;
            (TIMEOUT_EXIT_CODE, true)
        }
    };
    let elapsed = start.elapsed();

    // Grandchildren may hold the pipes open; don't wait on them forever.
    let deadline = Instant::now() + if timed_out { DRAIN_AFTER_KILL } else { DRAIN_AFTER_EXIT };
    let stdout = stdout.collect(deadline);
    let stderr = stderr.collect(deadline);

    Ok(TimedOutput {
        exit_code,
        stdout,
        stderr,
        timed_out,
        elapsed,
    })
}

/// Bytes read from one pipe so far, plus a signal for EOF.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let sink = Arc::clone(&buf);
            thread::spawn(move || {
                let mut chunk = [0u8; READ_CHUNK];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => sink.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
                let _ = tx.send(());
            });
        }
        Self { buf, done }
    }

    /// Wait for EOF until `deadline`, then take whatever has been read.
    fn collect(self, deadline: Instant) -> Vec<u8> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let _ = self.done.recv_timeout(remaining);
        std::mem::take(&mut *self.buf.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers; the child leads group `pgid`
    // (process_group(0) above) and has not been reaped yet.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

fn wait_for_child(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Map an exit status to a single integer; signal deaths become `128 + signal`.
pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    TIMEOUT_EXIT_CODE
}

//! Process Runner
//!
//! Spawns candidate build and run commands as child processes and times
//! the run window. Failures to spawn never escape this module; they become
//! synthetic exit codes plus a diagnostic on stderr.

use brcbench_core::Candidate;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code reported when a command could not be spawned
pub const SPAWN_FAILURE_CODE: i32 = 1;

/// Exit code reported when a command outlived its timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Window between SIGTERM and SIGKILL on timeout
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Result of one timed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunAttempt {
    /// Wall-clock seconds between spawn and exit
    pub duration: f64,
    /// Exit code, 0 on success
    pub exit_code: i32,
    /// Captured stdout with line breaks removed
    pub output: String,
    /// Whether the timeout fired
    pub timed_out: bool,
}

impl RunAttempt {
    /// A run that never started
    pub fn spawn_failure() -> Self {
        Self {
            duration: 0.0,
            exit_code: SPAWN_FAILURE_CODE,
            output: String::new(),
            timed_out: false,
        }
    }

    /// Whether the process exited cleanly
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes candidate commands.
///
/// `build` is only called for candidates that have a build command.
pub trait ProcessRunner {
    /// Run the build command; returns its exit code
    fn build(&self, candidate: &Candidate) -> i32;

    /// Run the candidate once against `input`
    fn run(&self, candidate: &Candidate, input: &Path) -> RunAttempt;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn build(&self, candidate: &Candidate) -> i32 {
        (**self).build(candidate)
    }

    fn run(&self, candidate: &Candidate, input: &Path) -> RunAttempt {
        (**self).run(candidate, input)
    }
}

/// Runner backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Create a runner; `None` waits for children indefinitely
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Configured per-command timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl ProcessRunner for CommandRunner {
    fn build(&self, candidate: &Candidate) -> i32 {
        let Some((program, args)) = candidate.build.as_deref().and_then(|argv| argv.split_first())
        else {
            return 0;
        };

        tracing::debug!(candidate = %candidate.name, cwd = %candidate.cwd.display(), "building");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&candidate.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if self.timeout.is_some() {
            isolate_group(&mut command);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                eprintln!(
                    "failed to run {}: {}",
                    candidate.build.as_deref().unwrap_or_default().join(" "),
                    e
                );
                return SPAWN_FAILURE_CODE;
            }
        };

        match wait_bounded(child, self.timeout) {
            Ok(Waited::Exited(status)) => exit_code(status),
            Ok(Waited::TimedOut) => {
                tracing::debug!(candidate = %candidate.name, "build timed out");
                TIMEOUT_EXIT_CODE
            }
            Err(e) => {
                eprintln!("{}: failed waiting for build: {}", candidate.name, e);
                SPAWN_FAILURE_CODE
            }
        }
    }

    fn run(&self, candidate: &Candidate, input: &Path) -> RunAttempt {
        let argv = candidate.run.render(input);
        let Some((program, args)) = argv.split_first() else {
            return RunAttempt::spawn_failure();
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&candidate.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.timeout.is_some() {
            isolate_group(&mut command);
        }

        // Timing covers spawn through exit, nothing else.
        let start = Instant::now();
        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                eprintln!("{}: failed to execute: {}", candidate.name, e);
                return RunAttempt::spawn_failure();
            }
        };

        let collected = match self.timeout {
            None => child.wait_with_output().map(|output| (output, false)),
            Some(limit) => wait_with_output_bounded(child, limit),
        };
        let duration = start.elapsed().as_secs_f64();

        match collected {
            Ok((output, timed_out)) => {
                let exit_code = if timed_out {
                    TIMEOUT_EXIT_CODE
                } else {
                    exit_code(output.status)
                };
                let stdout = strip_line_breaks(&output.stdout);
                tracing::debug!(
                    candidate = %candidate.name,
                    exit_code,
                    seconds = duration,
                    "run finished"
                );
                tracing::trace!(candidate = %candidate.name, stdout = %stdout, "stdout");
                if !output.stderr.is_empty() {
                    tracing::trace!(
                        candidate = %candidate.name,
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "stderr"
                    );
                }
                RunAttempt {
                    duration,
                    exit_code,
                    output: stdout,
                    timed_out,
                }
            }
            Err(e) => {
                eprintln!("{}: failed to execute: {}", candidate.name, e);
                RunAttempt::spawn_failure()
            }
        }
    }
}

/// Outcome of a bounded wait
enum Waited {
    Exited(ExitStatus),
    TimedOut,
}

/// Wait for `child`, terminating its process group once `timeout` elapses.
///
/// The blocking `wait` runs on a helper thread and hands the status back
/// over a channel, so the caller wakes the moment the child exits.
fn wait_bounded(mut child: Child, timeout: Option<Duration>) -> std::io::Result<Waited> {
    let Some(limit) = timeout else {
        return child.wait().map(Waited::Exited);
    };

    let pid = child.id();
    let _interrupt = interrupt::track(pid);
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    let waited = match rx.recv_timeout(limit) {
        Ok(status) => status.map(Waited::Exited),
        Err(RecvTimeoutError::Timeout) => {
            terminate(pid, &rx);
            Ok(Waited::TimedOut)
        }
        Err(RecvTimeoutError::Disconnected) => Err(std::io::Error::other(
            "wait thread exited without reporting a status",
        )),
    };
    let _ = waiter.join();
    waited
}

/// Bounded variant of `Child::wait_with_output`.
///
/// Pipes are drained on helper threads so a chatty child cannot block on a
/// full pipe while the harness waits.
fn wait_with_output_bounded(
    mut child: Child,
    limit: Duration,
) -> std::io::Result<(Output, bool)> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let waited = wait_bounded(child, Some(limit))?;

    let stdout = stdout.map(join_drain).unwrap_or_default();
    let stderr = stderr.map(join_drain).unwrap_or_default();

    Ok(match waited {
        Waited::Exited(status) => (
            Output {
                status,
                stdout,
                stderr,
            },
            false,
        ),
        Waited::TimedOut => (
            Output {
                status: killed_status(),
                stdout,
                stderr,
            },
            true,
        ),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

/// SIGTERM, short grace period, then SIGKILL.
///
/// Signals go to the child's process group so grandchildren holding the
/// output pipes die with it. Returns once the wait thread has reaped the
/// child.
fn terminate(pid: u32, exited: &mpsc::Receiver<std::io::Result<ExitStatus>>) {
    if send_group_signal(pid, Signal::Term).is_ok() && exited.recv_timeout(TERMINATE_GRACE).is_ok()
    {
        let _ = send_group_signal(pid, Signal::Kill);
        return;
    }
    if send_group_signal(pid, Signal::Kill).is_ok() {
        let _ = exited.recv();
    }
}

#[derive(Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

/// Place the child in its own process group so a timeout can reach its descendants
#[cfg(unix)]
fn isolate_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_group(_command: &mut Command) {}

/// Ctrl-C forwarding for children in their own process group.
///
/// A child moved out of the harness's process group no longer sees the
/// terminal's SIGINT. While a group is tracked, a SIGINT delivered to the
/// harness is re-sent to that group before the harness dies with the
/// default disposition.
#[cfg(unix)]
mod interrupt {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    /// Upper bound on concurrently tracked groups; extra groups go untracked
    const SLOTS: usize = 64;

    static GROUPS: [AtomicI32; SLOTS] = [const { AtomicI32::new(0) }; SLOTS];
    static INSTALL: Once = Once::new();

    /// Keeps a group registered until dropped
    pub(super) struct GroupGuard {
        slot: Option<usize>,
    }

    pub(super) fn track(pgid: u32) -> GroupGuard {
        INSTALL.call_once(install_handler);
        let Ok(pgid) = i32::try_from(pgid) else {
            return GroupGuard { slot: None };
        };
        let slot = GROUPS.iter().position(|group| {
            group
                .compare_exchange(0, pgid, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        });
        if slot.is_none() {
            tracing::debug!(pgid, "too many process groups to forward Ctrl-C to");
        }
        GroupGuard { slot }
    }

    impl Drop for GroupGuard {
        fn drop(&mut self) {
            if let Some(slot) = self.slot {
                GROUPS[slot].store(0, Ordering::SeqCst);
            }
        }
    }

    fn install_handler() {
        let handler: extern "C" fn(libc::c_int) = forward;
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }

    /// Only async-signal-safe calls: atomic loads, `kill`, `signal`, `raise`.
    extern "C" fn forward(signo: libc::c_int) {
        for group in &GROUPS {
            let pgid = group.load(Ordering::SeqCst);
            if pgid > 0 {
                unsafe {
                    libc::kill(-pgid, signo);
                }
            }
        }
        unsafe {
            libc::signal(signo, libc::SIG_DFL);
            libc::raise(signo);
        }
    }

    #[cfg(test)]
    pub(super) fn tracked(pgid: i32) -> bool {
        GROUPS.iter().any(|group| group.load(Ordering::SeqCst) == pgid)
    }
}

#[cfg(not(unix))]
mod interrupt {
    pub(super) struct GroupGuard;

    pub(super) fn track(_pgid: u32) -> GroupGuard {
        GroupGuard
    }
}

/// Signal a process group. Returns `Err` if the signal could not be delivered.
#[cfg(unix)]
fn send_group_signal(pid: u32, signal: Signal) -> Result<(), std::io::Error> {
    let signo = match signal {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), signo) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn send_group_signal(_pid: u32, _signal: Signal) -> Result<(), std::io::Error> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

/// Status placeholder for a child we killed ourselves
#[cfg(unix)]
fn killed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(libc::SIGKILL)
}

#[cfg(not(unix))]
fn killed_status() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(TIMEOUT_EXIT_CODE as u32)
}

/// Map an exit status to an integer code; signals become negative.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    SPAWN_FAILURE_CODE
}

fn strip_line_breaks(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace(['\n', '\r'], "")
}

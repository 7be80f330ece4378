//! Child process lifecycle for collaborator commands
//!
//! Package managers hold a database lock while they run. If pkgsvc is killed
//! mid-install, an orphaned `apt-get` or `pacman` would keep that lock and
//! keep mutating the system with nobody watching.
//!
//! - Every collaborator gets a parent-death signal, and runs in its own
//!   process group unless it needs the terminal (elevation prompts)
//! - Running child PIDs are tracked in a global registry
//! - On SIGINT/SIGTERM/SIGHUP or guard drop, each group gets SIGTERM, then
//!   SIGKILL once the grace period runs out

use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Grace period between SIGTERM and SIGKILL when a signal arrives.
pub const SIGNAL_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Grace period used when a `ProcessGuard` is dropped.
pub const DROP_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Registry of collaborator processes that are currently running
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    cleanup_initiated: bool,
}

impl ChildRegistry {
    /// Get or create the global child registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!(pid, "registered child process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        debug!(pid, "unregistered child process");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// Terminate all tracked process groups.
    ///
    /// Sends SIGTERM, waits up to `grace_period` for the groups to exit, then
    /// sends SIGKILL to whatever is left. Runs at most once per registry.
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.cleanup_initiated {
            debug!("cleanup already initiated, skipping");
            return;
        }
        self.cleanup_initiated = true;

        if self.pids.is_empty() {
            return;
        }

        info!(count = self.pids.len(), "terminating child processes");

        let pids: Vec<u32> = self.pids.iter().copied().collect();
        for &pid in &pids {
            signal_group_or_process(pid, Signal::SIGTERM);
        }

        let start = Instant::now();
        while start.elapsed() < grace_period {
            if pids.iter().all(|&pid| !is_process_alive(pid)) {
                info!("all child processes terminated gracefully");
                self.pids.clear();
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        for &pid in &pids {
            if is_process_alive(pid) {
                warn!(pid, "process group did not terminate, sending SIGKILL");
                signal_group_or_process(pid, Signal::SIGKILL);
            }
        }

        self.pids.clear();
    }
}

/// Signal the whole process group led by `pid`, falling back to the single
/// process when the group is gone.
fn signal_group_or_process(pid: u32, sig: Signal) {
    if let Err(e) = signal::kill(Pid::from_raw(-(pid as i32)), sig) {
        debug!(pid, error = %e, "group signal failed, signalling process directly");
        if let Err(e) = signal::kill(Pid::from_raw(pid as i32), sig) {
            warn!(pid, signal = ?sig, error = %e, "failed to signal child process");
        }
    }
}

/// Check if a process is still alive (zombies count as dead)
fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // Field 3 of /proc/<pid>/stat is the run state
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        if let Some(state) = stat.split_whitespace().nth(2) {
            return !matches!(state, "Z" | "X");
        }
    }

    true
}

/// RAII guard that terminates all registered children on drop.
///
/// Held by `main` for the lifetime of a run so that an early return or panic
/// unwinding never leaves a collaborator behind.
pub struct ProcessGuard {
    registry: Arc<Mutex<ChildRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ChildRegistry::global(),
        }
    }

    pub fn child_count(&self) -> usize {
        self.registry.lock().map(|r| r.count()).unwrap_or(0)
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.terminate_all(DROP_GRACE_PERIOD);
        }
    }
}

/// Install handlers for SIGINT, SIGTERM and SIGHUP.
///
/// The listener thread terminates every registered child group and exits
/// with `128 + signal`. Call once at program start.
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "received signal, cleaning up");
            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.terminate_all(SIGNAL_GRACE_PERIOD);
            }
            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Extension trait for `std::process::Command` tying the child's lifetime to
/// ours.
pub trait CommandProcessGroup {
    /// Run the child as the leader of its own process group, with a
    /// parent-death signal, so the whole tree can be signalled at once.
    fn in_new_process_group(&mut self) -> &mut Self;

    /// Only set the parent-death signal. The child stays in our process group
    /// and keeps access to the controlling terminal.
    fn with_parent_death_signal(&mut self) -> &mut Self;
}

fn set_parent_death_signal() -> std::io::Result<()> {
    // SAFETY: prctl is async-signal-safe
    if unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) } == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        // SAFETY: the closure only calls async-signal-safe functions
        // (setpgid, prctl) between fork and exec.
        unsafe {
            self.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(std::io::Error::other)?;
                set_parent_death_signal()
            });
        }
        self
    }

    fn with_parent_death_signal(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        // SAFETY: see in_new_process_group
        unsafe {
            self.pre_exec(set_parent_death_signal);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn wait_for_process_death(pid: u32, timeout: Duration) -> bool {
        use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};

        let start = Instant::now();
        let nix_pid = Pid::from_raw(pid as i32);

        while start.elapsed() < timeout {
            match waitpid(nix_pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(_, _)) | Ok(WaitStatus::Signaled(_, _, _)) => return true,
                Err(nix::errno::Errno::ECHILD) if !is_process_alive(pid) => return true,
                _ => {}
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_registry_register_unregister() {
        let mut registry = ChildRegistry::default();

        registry.register(1234);
        registry.register(5678);
        assert_eq!(registry.count(), 2);

        registry.unregister(1234);
        assert_eq!(registry.count(), 1);

        registry.unregister(5678);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_terminate_all_kills_process_group() {
        let child = Command::new("sh")
            .args(["-c", "sleep 60"])
            .in_new_process_group()
            .spawn()
            .expect("Failed to spawn sleep process");
        let pid = child.id();

        let mut registry = ChildRegistry::default();
        registry.register(pid);
        assert!(is_process_alive(pid));

        registry.terminate_all(Duration::from_millis(500));

        assert!(wait_for_process_death(pid, Duration::from_secs(2)));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_terminate_all_handles_already_dead_process() {
        let mut child = Command::new("sh")
            .args(["-c", "exit 0"])
            .spawn()
            .expect("Failed to spawn sh");
        let pid = child.id();
        let _ = child.wait();

        let mut registry = ChildRegistry::default();
        registry.register(pid);
        registry.terminate_all(Duration::from_millis(100));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_cleanup_runs_once() {
        let mut registry = ChildRegistry::default();
        registry.register(999_999);

        registry.terminate_all(Duration::from_millis(10));
        assert!(registry.cleanup_initiated);

        // A late registration is not signalled by a second call
        registry.register(999_998);
        registry.terminate_all(Duration::from_millis(10));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_is_process_alive_nonexistent() {
        assert!(!is_process_alive(999_999));
    }
}

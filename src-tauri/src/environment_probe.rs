use std::{
    env, fmt,
    io::Read,
    process::{Command, ExitStatus, Stdio},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use crate::{
    append_startup_log, render_mode::ProbeReport, DEFAULT_PROBE_TIMEOUT_MS, PROBE_TIMEOUT_ENV,
};

const DETECT_VIRT_COMMAND: &str = "systemd-detect-virt";
const LIST_PCI_COMMAND: &str = "lspci";
const GRAPHICS_CLASS_MARKERS: [&str; 3] = ["vga", "3d", "2d"];
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A probe could not produce an answer: missing utility, failed run or timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProbeUnavailable {
    pub(crate) command: String,
    pub(crate) cause: String,
}

impl ProbeUnavailable {
    pub(crate) fn new(command: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ProbeUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe '{}' unavailable: {}", self.command, self.cause)
    }
}

impl std::error::Error for ProbeUnavailable {}

pub(crate) trait EnvironmentProbe {
    fn detect_virtual_machine(&self) -> Result<bool, ProbeUnavailable>;

    /// Graphics device lines, lowercased.
    fn gpu_vendor_listing(&self) -> Result<String, ProbeUnavailable>;
}

/// Runs both probes concurrently. A probe that is unavailable contributes its
/// permissive default instead of an error.
pub(crate) fn collect_probe_report<P>(probe: &P) -> ProbeReport
where
    P: EnvironmentProbe + Sync,
{
    let (virtual_machine, gpu_listing) = thread::scope(|scope| {
        let virtual_machine = scope.spawn(|| probe.detect_virtual_machine());
        let gpu_listing = probe.gpu_vendor_listing();
        let virtual_machine = virtual_machine.join().unwrap_or_else(|_| {
            Err(ProbeUnavailable::new(
                DETECT_VIRT_COMMAND,
                "probe thread panicked",
            ))
        });
        (virtual_machine, gpu_listing)
    });

    let is_virtual_machine = virtual_machine.unwrap_or_else(|error| {
        append_startup_log(&format!("{error}; assuming not a virtual machine"));
        false
    });
    let gpu_vendor = gpu_listing.unwrap_or_else(|error| {
        append_startup_log(&format!("{error}; assuming no GPU restrictions"));
        String::new()
    });

    ProbeReport {
        is_virtual_machine,
        gpu_vendor,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SystemProbe {
    timeout: Duration,
}

impl SystemProbe {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub(crate) fn from_env() -> Self {
        Self::new(resolve_probe_timeout(env::var(PROBE_TIMEOUT_ENV).ok().as_deref()))
    }
}

impl EnvironmentProbe for SystemProbe {
    fn detect_virtual_machine(&self) -> Result<bool, ProbeUnavailable> {
        if !cfg!(target_os = "linux") {
            return Err(ProbeUnavailable::new(
                DETECT_VIRT_COMMAND,
                "not supported on this platform",
            ));
        }

        let output = run_probe_command(DETECT_VIRT_COMMAND, &[], self.timeout)?;
        interpret_detect_virt_output(output.status.success(), &output.stdout)
            .map_err(|cause| ProbeUnavailable::new(DETECT_VIRT_COMMAND, cause))
    }

    fn gpu_vendor_listing(&self) -> Result<String, ProbeUnavailable> {
        if !cfg!(target_os = "linux") {
            return Err(ProbeUnavailable::new(
                LIST_PCI_COMMAND,
                "not supported on this platform",
            ));
        }

        let output = run_probe_command(LIST_PCI_COMMAND, &[], self.timeout)?;
        if !output.status.success() {
            return Err(ProbeUnavailable::new(
                LIST_PCI_COMMAND,
                format!("exited with {}", output.status),
            ));
        }
        Ok(filter_graphics_devices(&output.stdout))
    }
}

pub(crate) fn resolve_probe_timeout(raw: Option<&str>) -> Duration {
    let timeout_ms = raw
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);
    Duration::from_millis(timeout_ms)
}

/// `systemd-detect-virt` prints the hypervisor name and exits 0 inside a VM,
/// and prints `none` with a non-zero exit on bare metal.
pub(crate) fn interpret_detect_virt_output(success: bool, output: &str) -> Result<bool, String> {
    let detected = output.trim().to_ascii_lowercase();
    if detected == "none" {
        return Ok(false);
    }
    if success {
        return Ok(!detected.is_empty());
    }
    Err(format!("unexpected output '{detected}'"))
}

pub(crate) fn filter_graphics_devices(listing: &str) -> String {
    listing
        .lines()
        .map(str::to_lowercase)
        .filter(|line| {
            GRAPHICS_CLASS_MARKERS
                .iter()
                .any(|marker| line.contains(marker))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
struct ProbeOutput {
    status: ExitStatus,
    stdout: String,
}

fn run_probe_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<ProbeOutput, ProbeUnavailable> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|error| ProbeUnavailable::new(program, format!("failed to spawn: {error}")))?;

    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ProbeUnavailable::new(program, "stdout was not captured"));
    };

    // The pipe can outlive the child when it forks, so the read shares the deadline.
    let (output_tx, output_rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = String::new();
        let _ = output_tx.send(stdout.read_to_string(&mut buffer).map(|_| buffer));
    });

    let start_time = Instant::now();
    let timed_out = || {
        ProbeUnavailable::new(
            program,
            format!("timed out after {}ms", timeout.as_millis()),
        )
    };
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(error) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeUnavailable::new(
                    program,
                    format!("failed to poll process status: {error}"),
                ));
            }
        }

        if start_time.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timed_out());
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = match output_rx.recv_timeout(timeout.saturating_sub(start_time.elapsed())) {
        Ok(result) => result.map_err(|error| {
            ProbeUnavailable::new(program, format!("failed to read output: {error}"))
        })?,
        Err(RecvTimeoutError::Timeout) => return Err(timed_out()),
        Err(RecvTimeoutError::Disconnected) => {
            return Err(ProbeUnavailable::new(program, "output reader panicked"));
        }
    };

    Ok(ProbeOutput { status, stdout })
}

#[cfg(test)]
pub(crate) use test_support::StaticProbe;

#[cfg(test)]
mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{EnvironmentProbe, ProbeUnavailable};

    #[derive(Debug)]
    pub(crate) struct StaticProbe {
        pub(crate) virtual_machine: Result<bool, ProbeUnavailable>,
        pub(crate) gpu_listing: Result<String, ProbeUnavailable>,
        pub(crate) calls: AtomicUsize,
    }

    impl Default for StaticProbe {
        fn default() -> Self {
            Self {
                virtual_machine: Ok(false),
                gpu_listing: Ok(String::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl StaticProbe {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EnvironmentProbe for StaticProbe {
        fn detect_virtual_machine(&self) -> Result<bool, ProbeUnavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.virtual_machine.clone()
        }

        fn gpu_vendor_listing(&self) -> Result<String, ProbeUnavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gpu_listing.clone()
        }
    }
}

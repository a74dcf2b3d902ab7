//! Startup decision between hardware-accelerated and software compositing.
//!
//! Rules are evaluated in a fixed order and the first one that applies wins.
//! When no rule applies the web engine keeps hardware acceleration.

use crate::environment_probe::{self, EnvironmentProbe};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RenderConfig {
    pub(crate) disable_gpu: bool,
}

/// Environment facts gathered once at startup. `gpu_vendor` is lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProbeReport {
    pub(crate) is_virtual_machine: bool,
    pub(crate) gpu_vendor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderReason {
    GpuDisabledByConfig,
    VirtualMachine,
    NvidiaGpu,
    HardwareAvailable,
}

impl RenderReason {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::GpuDisabledByConfig => "GPU disabled by configuration",
            Self::VirtualMachine => "virtual machine detected",
            Self::NvidiaGpu => "NVIDIA GPU detected",
            Self::HardwareAvailable => "no software rendering rule applied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RenderDecision {
    pub(crate) use_software_rendering: bool,
    pub(crate) reason: RenderReason,
}

struct SoftwareRenderingRule {
    reason: RenderReason,
    applies: fn(&RenderConfig, &ProbeReport) -> bool,
}

fn gpu_disabled(config: &RenderConfig, _: &ProbeReport) -> bool {
    config.disable_gpu
}

fn running_in_virtual_machine(_: &RenderConfig, report: &ProbeReport) -> bool {
    report.is_virtual_machine
}

fn nvidia_gpu_present(_: &RenderConfig, report: &ProbeReport) -> bool {
    report.gpu_vendor.to_ascii_lowercase().contains("nvidia")
}

const SOFTWARE_RENDERING_RULES: [SoftwareRenderingRule; 3] = [
    SoftwareRenderingRule {
        reason: RenderReason::GpuDisabledByConfig,
        applies: gpu_disabled,
    },
    SoftwareRenderingRule {
        reason: RenderReason::VirtualMachine,
        applies: running_in_virtual_machine,
    },
    SoftwareRenderingRule {
        reason: RenderReason::NvidiaGpu,
        applies: nvidia_gpu_present,
    },
];

pub(crate) fn decide(config: &RenderConfig, report: &ProbeReport) -> RenderDecision {
    SOFTWARE_RENDERING_RULES
        .iter()
        .find(|rule| (rule.applies)(config, report))
        .map(|rule| RenderDecision {
            use_software_rendering: true,
            reason: rule.reason,
        })
        .unwrap_or(RenderDecision {
            use_software_rendering: false,
            reason: RenderReason::HardwareAvailable,
        })
}

/// Runs the environment probes only when the configuration leaves the choice open.
pub(crate) fn select_render_mode<P>(config: &RenderConfig, probe: &P) -> RenderDecision
where
    P: EnvironmentProbe + Sync,
{
    if config.disable_gpu {
        return decide(config, &ProbeReport::default());
    }

    let report = environment_probe::collect_probe_report(probe);
    decide(config, &report)
}

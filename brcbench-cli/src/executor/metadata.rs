//! System Metadata Collection
//!
//! Describes the host in the report so timings from different machines are
//! never compared by accident. The CPU model is read from `/proc/cpuinfo`
//! and is "Unknown" elsewhere.

use brcbench_report::SystemInfo;

/// Keys that carry a human-readable CPU name across Linux architectures
const CPU_MODEL_KEYS: [&str; 3] = ["model name", "Hardware", "cpu model"];

/// Describe the machine the harness is running on
pub fn collect_system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1),
    }
}

#[cfg(target_os = "linux")]
fn cpu_model() -> Option<String> {
    let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").ok()?;
    parse_cpu_model(&cpuinfo)
}

#[cfg(not(target_os = "linux"))]
fn cpu_model() -> Option<String> {
    None
}

fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (CPU_MODEL_KEYS.contains(&key.trim()) && !value.is_empty()).then(|| value.to_string())
    })
}

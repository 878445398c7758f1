use std::cmp::Ordering;
use std::env;
use std::process::Command;

// CPU features that have accelerated kernels in this crate
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    cfg_flag: &'static str,
    arch: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Lowest number == highest priority
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "neon" => 1,
            _ => usize::MAX,
        }
    }

    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2",
                cfg_flag: "avx2",
                arch: "x86_64",
                detected: false,
            },
            CpuFeature {
                name: "neon",
                cfg_flag: "neon",
                arch: "aarch64",
                detected: false,
            },
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            for feature in features.iter_mut() {
                // aarch64 kernels report NEON as "asimd"
                feature.detected = contents.contains(feature.name)
                    || (feature.name == "neon" && contents.contains("asimd"));
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                match feature.name {
                    "avx2" => feature.detected = contents.contains("hw.optional.avx2_0: 1"),
                    "neon" => {
                        feature.detected = contents.contains("hw.optional.neon: 1")
                            || contents.contains("hw.optional.arm.fp_simd: 1")
                    }
                    _ => {}
                }
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }

        // NEON is part of the aarch64 baseline
        let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
        for feature in features.iter_mut() {
            if feature.name == "neon" && target_arch == "aarch64" {
                feature.detected = true;
            }
        }
    }

    fn apply(features: &mut [CpuFeature]) {
        let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

        features.sort();

        // Kernels for other architectures never compile, whatever the host reports
        let cfg_flag = features
            .iter()
            .find(|cpu_feature| cpu_feature.detected && cpu_feature.arch == target_arch)
            .map(|cpu_feature| cpu_feature.cfg_flag)
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut features = CpuFeature::features();

    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();

    // Only run CPU detection for native builds
    if host == target {
        PlatformDetector::detect_cpu_features(&mut features);
    }

    PlatformDetector::apply(&mut features);
}

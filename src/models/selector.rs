//! Separation model selection.
//!
//! An explicit quality choice maps straight to its configured model. `auto`
//! picks the higher-capacity model when either hardware signal (a GPU from
//! a known-capable family, or enough logical cores) says the machine can
//! take it. This is a coarse heuristic; the only contract is that the same
//! signals always give the same tier.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// GPU descriptor fragments (matched case-insensitively) that count as capable.
pub const CAPABLE_GPU_PATTERNS: &[&str] =
    &["rtx", "rx", "apple", "arc", "vega", "gtx 16", "m1", "m2"];

/// Logical core count at which the CPU alone counts as capable.
pub const MIN_CAPABLE_CORES: usize = 8;

/// Core count assumed when the platform cannot report one.
pub const FALLBACK_CORES: usize = 4;

/// Descriptor used when no GPU is detected.
pub const NO_GPU: &str = "CPU";

/// Quality requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    /// Decide from hardware signals.
    #[default]
    Auto,
    /// Always use the low-capacity model.
    Tiny,
    /// Always use the high-capacity model.
    Medium,
}

impl ModelChoice {
    /// Returns the string representation of the choice.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelChoice::Auto => "auto",
            ModelChoice::Tiny => "tiny",
            ModelChoice::Medium => "medium",
        }
    }

    /// Parses a choice from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(ModelChoice::Auto),
            "tiny" => Some(ModelChoice::Tiny),
            "medium" => Some(ModelChoice::Medium),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Model capacity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    Tiny,
    Medium,
}

/// The two inputs of automatic selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareSignals {
    /// Renderer/adapter name, or [`NO_GPU`].
    pub gpu_descriptor: String,
    /// Logical cores available to this process.
    pub logical_cores: usize,
}

impl HardwareSignals {
    pub fn new(gpu_descriptor: impl Into<String>, logical_cores: usize) -> Self {
        Self {
            gpu_descriptor: gpu_descriptor.into(),
            logical_cores,
        }
    }

    /// Probes the current machine. `gpu_override` replaces GPU probing.
    pub fn detect(gpu_override: Option<&str>) -> Self {
        let logical_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_CORES);
        let gpu_descriptor = gpu_override
            .map(str::to_string)
            .unwrap_or_else(probe_gpu_descriptor);

        Self {
            gpu_descriptor,
            logical_cores,
        }
    }

    /// Returns true if the GPU descriptor names a known-capable family.
    pub fn has_capable_gpu(&self) -> bool {
        let descriptor = self.gpu_descriptor.to_lowercase();
        CAPABLE_GPU_PATTERNS.iter().any(|p| descriptor.contains(p))
    }

    /// Classifies these signals into a tier.
    pub fn tier(&self) -> ModelTier {
        if self.has_capable_gpu() || self.logical_cores >= MIN_CAPABLE_CORES {
            ModelTier::Medium
        } else {
            ModelTier::Tiny
        }
    }
}

/// Best-effort GPU name lookup.
fn probe_gpu_descriptor() -> String {
    if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        return "Apple".to_string();
    }

    // NVIDIA's Linux driver exposes one directory per adapter.
    if let Ok(entries) = std::fs::read_dir("/proc/driver/nvidia/gpus") {
        for entry in entries.flatten() {
            let info = std::fs::read_to_string(entry.path().join("information"));
            if let Ok(info) = info {
                let model = info
                    .lines()
                    .find_map(|line| line.strip_prefix("Model:"))
                    .map(|m| m.trim().to_string());
                if let Some(model) = model {
                    return model;
                }
            }
        }
    }

    NO_GPU.to_string()
}

/// Maps a [`ModelChoice`] to a model location.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    tiny_url: String,
    medium_url: String,
    signals: HardwareSignals,
}

impl ModelSelector {
    pub fn new(
        tiny_url: impl Into<String>,
        medium_url: impl Into<String>,
        signals: HardwareSignals,
    ) -> Self {
        Self {
            tiny_url: tiny_url.into(),
            medium_url: medium_url.into(),
            signals,
        }
    }

    /// Creates a selector from configured URLs and probed hardware.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.model_url_tiny.clone(),
            config.model_url_medium.clone(),
            HardwareSignals::detect(config.gpu_descriptor.as_deref()),
        )
    }

    /// Returns the hardware signals used for `auto`.
    pub fn signals(&self) -> &HardwareSignals {
        &self.signals
    }

    /// Returns the tier a choice resolves to.
    pub fn tier(&self, choice: ModelChoice) -> ModelTier {
        match choice {
            ModelChoice::Tiny => ModelTier::Tiny,
            ModelChoice::Medium => ModelTier::Medium,
            ModelChoice::Auto => self.signals.tier(),
        }
    }

    /// Returns the model URL for a choice.
    pub fn select(&self, choice: ModelChoice) -> &str {
        match self.tier(choice) {
            ModelTier::Tiny => &self.tiny_url,
            ModelTier::Medium => &self.medium_url,
        }
    }
}

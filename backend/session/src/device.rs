//! Device capability probe run after models load.

use ragchat_core::{Engine, RagChatError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Capabilities reported by the engine's GPU adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub max_buffer_binding: u64,
    pub vendor: String,
}

/// Thresholds deciding whether a device is resource-restricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePolicy {
    pub restricted_vendors: Vec<String>,
    pub min_buffer_binding_bytes: u64,
}

impl DevicePolicy {
    pub fn is_restricted(&self, profile: &DeviceProfile) -> bool {
        let vendor = profile.vendor.trim();
        let small_buffer = profile.max_buffer_binding <= self.min_buffer_binding_bytes;
        let limited_vendor = self
            .restricted_vendors
            .iter()
            .any(|v| v.eq_ignore_ascii_case(vendor));
        debug!(vendor, small_buffer, limited_vendor, "Evaluated device profile");
        small_buffer || limited_vendor
    }
}

/// Query the engine for the two device properties the policy needs.
pub async fn probe_device(engine: &dyn Engine) -> Result<DeviceProfile> {
    let max_buffer_binding = engine
        .device_max_buffer_binding()
        .await
        .map_err(|e| RagChatError::DeviceProbe(e.to_string()))?;
    let vendor = engine
        .device_vendor()
        .await
        .map_err(|e| RagChatError::DeviceProbe(e.to_string()))?;

    info!(max_buffer_binding, vendor = %vendor, "Probed device");
    Ok(DeviceProfile {
        max_buffer_binding,
        vendor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn policy() -> DevicePolicy {
        DevicePolicy {
            restricted_vendors: vec!["qualcomm".into(), "arm".into()],
            min_buffer_binding_bytes: 128 * MIB,
        }
    }

    fn profile(max_buffer_binding: u64, vendor: &str) -> DeviceProfile {
        DeviceProfile {
            max_buffer_binding,
            vendor: vendor.into(),
        }
    }

    #[test]
    fn test_buffer_boundary() {
        assert!(policy().is_restricted(&profile(128 * MIB, "nvidia")));
        assert!(policy().is_restricted(&profile(64 * MIB, "nvidia")));
        assert!(!policy().is_restricted(&profile(128 * MIB + 1, "nvidia")));
    }

    #[test]
    fn test_restricted_vendors() {
        assert!(policy().is_restricted(&profile(4096 * MIB, "qualcomm")));
        assert!(policy().is_restricted(&profile(4096 * MIB, "arm")));
        assert!(policy().is_restricted(&profile(4096 * MIB, "Qualcomm")));
        assert!(!policy().is_restricted(&profile(4096 * MIB, "apple")));
        assert!(!policy().is_restricted(&profile(4096 * MIB, "")));
    }
}

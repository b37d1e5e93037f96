//! Cross-device consistency check on read-back output.
//!
//! Every device of one platform received the same change, so their
//! read-backs should have the same number of lines. A mismatch is a
//! warning for the operator, not an error.

use indexmap::IndexMap;
use serde::Serialize;

use super::device::DeviceResult;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineCount {
    pub hostname: String,
    pub platform: Platform,
    pub result_line_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Line counts grouped by platform, in the order results were collected.
    pub per_platform: IndexMap<Platform, Vec<LineCount>>,
    /// `true` when a platform's devices disagree on line count.
    pub inconsistency_flags: IndexMap<Platform, bool>,
}

impl ValidationSummary {
    pub fn is_inconsistent(&self, platform: Platform) -> bool {
        self.inconsistency_flags
            .get(&platform)
            .copied()
            .unwrap_or(false)
    }

    pub fn any_inconsistent(&self) -> bool {
        self.inconsistency_flags.values().any(|flag| *flag)
    }
}

/// Summarize line counts per platform.
///
/// The first device seen for a platform sets the baseline; any other count
/// flags the platform. Failed devices count as zero lines, so a failure
/// next to a success also raises the flag. Devices whose type is not a
/// supported platform are left out.
pub fn validate(results: &[DeviceResult]) -> ValidationSummary {
    let mut summary = ValidationSummary::default();

    for result in results {
        let Ok(platform) = result.device.platform() else {
            continue;
        };
        let count = result.line_count();

        let entries = summary.per_platform.entry(platform).or_default();
        let baseline = entries.first().map_or(count, |first| first.result_line_count);
        entries.push(LineCount {
            hostname: result.device.hostname.clone(),
            platform,
            result_line_count: count,
        });

        let flag = summary.inconsistency_flags.entry(platform).or_insert(false);
        if count != baseline {
            *flag = true;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::device::{Device, FailureKind};

    fn ok(host: &str, device_type: &str, lines: usize) -> DeviceResult {
        let output = vec!["entry"; lines].join("\n");
        DeviceResult::success(Device::new(host, device_type), output)
    }

    #[test]
    fn test_consistent_platform() {
        let results = vec![
            ok("sw1", "cisco_ios", 5),
            ok("sw2", "cisco_ios", 5),
            ok("sw3", "cisco_ios", 5),
        ];
        let summary = validate(&results);
        assert!(!summary.is_inconsistent(Platform::CiscoIos));
        assert!(!summary.any_inconsistent());
        assert_eq!(summary.per_platform[&Platform::CiscoIos].len(), 3);
    }

    #[test]
    fn test_nxos_three_devices() {
        let differing = vec![
            ok("nx1", "cisco_nxos", 5),
            ok("nx2", "cisco_nxos", 5),
            ok("nx3", "cisco_nxos", 7),
        ];
        let summary = validate(&differing);
        assert!(summary.is_inconsistent(Platform::CiscoNxos));
        assert!(!summary.is_inconsistent(Platform::CiscoIos));

        let matching = vec![
            ok("nx1", "cisco_nxos", 5),
            ok("nx2", "cisco_nxos", 5),
            ok("nx3", "cisco_nxos", 5),
        ];
        let summary = validate(&matching);
        assert!(!summary.is_inconsistent(Platform::CiscoNxos));
        assert_eq!(summary.per_platform[&Platform::CiscoNxos].len(), 3);
    }

    #[test]
    fn test_mismatch_flags_platform() {
        let results = vec![
            ok("sw1", "cisco_ios", 5),
            ok("sw2", "cisco_ios", 5),
            ok("sw3", "cisco_ios", 7),
            ok("nx1", "cisco_nxos", 4),
            ok("nx2", "cisco_nxos", 4),
        ];
        let summary = validate(&results);
        assert!(summary.is_inconsistent(Platform::CiscoIos));
        assert!(!summary.is_inconsistent(Platform::CiscoNxos));

        let counts: Vec<usize> = summary.per_platform[&Platform::CiscoIos]
            .iter()
            .map(|c| c.result_line_count)
            .collect();
        assert_eq!(counts, vec![5, 5, 7]);
    }

    #[test]
    fn test_failure_counts_as_zero() {
        let results = vec![
            ok("nx1", "cisco_nxos", 3),
            DeviceResult::failure(Device::new("nx2", "cisco_nxos"), FailureKind::Connection, "refused"),
        ];
        let summary = validate(&results);
        assert!(summary.is_inconsistent(Platform::CiscoNxos));
        assert_eq!(summary.per_platform[&Platform::CiscoNxos][1].result_line_count, 0);
    }

    #[test]
    fn test_unsupported_devices_skipped() {
        let results = vec![
            ok("sw1", "cisco_ios", 2),
            DeviceResult::failure(
                Device::new("fw1", "juniper_junos"),
                FailureKind::UnsupportedPlatform,
                "unsupported",
            ),
        ];
        let summary = validate(&results);
        assert_eq!(summary.per_platform.len(), 1);
        assert!(!summary.any_inconsistent());
    }

    #[test]
    fn test_empty_results() {
        let summary = validate(&[]);
        assert!(summary.per_platform.is_empty());
        assert!(summary.inconsistency_flags.is_empty());
    }

    #[test]
    fn test_serialized_keys_use_platform_names() {
        let summary = validate(&[ok("sw1", "cisco_ios", 1)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["per_platform"]["cisco_ios"][0]["hostname"], "sw1");
        assert_eq!(json["inconsistency_flags"]["cisco_ios"], false);
    }
}

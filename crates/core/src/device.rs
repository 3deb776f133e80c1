use tracing::debug;

use crate::command::{require_success, CommandRunner};
use crate::error::CollaboratorError;
use crate::model::DeviceHandle;

pub const LSBLK: &str = "lsblk";
const LSBLK_ARGS: &[&str] = &["-dn", "-o", "NAME,TYPE"];

/// Lists block devices of type `disk` via `lsblk`.
pub fn enumerate_disks(runner: &dyn CommandRunner) -> Result<Vec<DeviceHandle>, CollaboratorError> {
    let output = require_success(LSBLK, runner.run(LSBLK, LSBLK_ARGS)?)?;
    Ok(parse_device_list(&output.stdout))
}

pub fn parse_device_list(stdout: &str) -> Vec<DeviceHandle> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = line.split_whitespace().collect::<Vec<_>>();
            match fields.as_slice() {
                [name, kind] => Some((*name, *kind)),
                _ => {
                    debug!(line, "skipping malformed device line");
                    None
                }
            }
        })
        .filter(|(_, kind)| *kind == "disk")
        .map(|(name, _)| DeviceHandle::from_name(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_device_list;

    fn paths(stdout: &str) -> Vec<String> {
        parse_device_list(stdout)
            .into_iter()
            .map(|device| device.as_str().to_string())
            .collect()
    }

    #[test]
    fn keeps_only_disk_entries() {
        assert_eq!(paths("sda disk\nsda1 part\n"), vec!["/dev/sda"]);
    }

    #[test]
    fn fixture_yields_whole_disks_in_order() {
        assert_eq!(
            paths(include_str!("../../../fixtures/lsblk-sample.txt")),
            vec!["/dev/sda", "/dev/nvme0n1"]
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let stdout = "sda disk\nloop0\nsdb disk extra\n\nsdc   disk\n";
        assert_eq!(paths(stdout), vec!["/dev/sda", "/dev/sdc"]);
    }

    #[test]
    fn type_match_is_exact() {
        assert_eq!(paths("sda DISK\nmd0 raid1\n"), Vec::<String>::new());
    }
}

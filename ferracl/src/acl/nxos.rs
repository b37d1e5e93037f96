//! Cisco NX-OS ACL sequencing.
//!
//! NX-OS has a single ACL type, so the ACL name alone identifies it.

use super::{AclChangeRequest, AclMode, CommandSequence, verify_command};

pub(super) fn build_sequence(request: &AclChangeRequest, delay_factor: u32) -> CommandSequence {
    let mut setup = Vec::with_capacity(request.acl_body.len() + 2);

    if request.mode == AclMode::Replace {
        setup.push(format!("no ip access-list {}", request.acl_name));
    }
    setup.push(format!("ip access-list {}", request.acl_name));
    setup.extend(request.acl_body.iter().cloned());

    CommandSequence {
        setup,
        verify: verify_command(&request.acl_name),
        delay_factor: Some(delay_factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_starts_with_deletion() {
        let request = AclChangeRequest::new("DC_IN", "10 permit ip any any", AclMode::Replace, false);
        let seq = build_sequence(&request, 10);
        assert_eq!(seq.setup[0], "no ip access-list DC_IN");
        assert_eq!(seq.setup[1], "ip access-list DC_IN");
        assert_eq!(seq.setup[2], "10 permit ip any any");
    }

    #[test]
    fn test_append_never_deletes() {
        let request = AclChangeRequest::new("DC_IN", "10 permit ip any any", AclMode::Append, true);
        let seq = build_sequence(&request, 10);
        assert_eq!(seq.setup, vec!["ip access-list DC_IN", "10 permit ip any any"]);
        assert!(!seq.setup.iter().any(|c| c.starts_with("no ")));
    }

    #[test]
    fn test_extended_flag_ignored() {
        let standard = AclChangeRequest::new("X", "permit ip any any", AclMode::Replace, false);
        let extended = AclChangeRequest {
            extended: true,
            ..standard.clone()
        };
        assert_eq!(build_sequence(&standard, 10), build_sequence(&extended, 10));
    }

    #[test]
    fn test_delay_factor_attached() {
        let request = AclChangeRequest::new("X", "", AclMode::Append, false);
        assert_eq!(build_sequence(&request, 2).delay_factor, Some(2));
        assert_eq!(build_sequence(&request, 10).verify, "show ip access-list X");
    }
}

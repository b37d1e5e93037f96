//! Cisco IOS ACL sequencing.
//!
//! IOS names the ACL type in both the deletion and the entry command.

use super::{AclChangeRequest, AclMode, CommandSequence, verify_command};

fn acl_type(extended: bool) -> &'static str {
    if extended { "extended" } else { "standard" }
}

pub(super) fn build_sequence(request: &AclChangeRequest) -> CommandSequence {
    let kind = acl_type(request.extended);
    let mut setup = Vec::with_capacity(request.acl_body.len() + 2);

    if request.mode == AclMode::Replace {
        setup.push(format!("no ip access-list {} {}", kind, request.acl_name));
    }
    setup.push(format!("ip access-list {} {}", kind, request.acl_name));
    setup.extend(request.acl_body.iter().cloned());

    CommandSequence {
        setup,
        verify: verify_command(&request.acl_name),
        delay_factor: None,
    }
}

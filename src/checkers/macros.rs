/// Report a finding from inside [`Checker::analyze`](super::Checker::analyze).
///
/// Without a findings list the enclosing `analyze` returns `true` right away.
/// With `only_automatic` set, findings offering no automatic replacement
/// are dropped, but the error still counts as found.
#[macro_export]
macro_rules! emit {
    ($findings:expr, $only_automatic:expr, $finding:expr) => {
        match $findings.as_deref_mut() {
            None => return true,
            Some(out) => {
                let finding: $crate::types::Finding = $finding;
                if !$only_automatic || finding.is_automatic_bot() {
                    out.push(finding);
                }
            }
        }
    };
}

//! Permission overwrite translation.

use crate::IdMap;
use crate::model::{Overwrite, OverwriteSubject, RoleId};

/// Translate source permission overwrites into target-equivalent ones.
///
/// Role subjects are rewritten through the role map; a miss (a role that
/// failed to clone) passes the original id through unchanged rather than
/// failing. Member subjects are never rewritten: member ids are
/// platform-global and assumed meaningful in the target guild. List order
/// and allow/deny bitsets are preserved verbatim.
///
/// Pure: no side effects, no failure modes, empty in yields empty out.
pub fn translate_overwrites(overwrites: &[Overwrite], role_map: &IdMap<RoleId>) -> Vec<Overwrite> {
    overwrites
        .iter()
        .map(|overwrite| {
            let subject = match overwrite.subject {
                OverwriteSubject::Role(id) => OverwriteSubject::Role(role_map.translate(id)),
                OverwriteSubject::Member(id) => OverwriteSubject::Member(id),
            };
            Overwrite {
                subject,
                allow: overwrite.allow,
                deny: overwrite.deny,
            }
        })
        .collect()
}

//! File classification and validation
//!
//! Two independent checks guard a submission:
//! - `missing_extensions`: is every required extension present at all?
//! - `classify_by_role`: can each of the six roles be filled by name pattern?
//!
//! They overlap (a complete role assignment implies all extensions are
//! present) but report different failures, so both are kept.

use crate::error::{IntakeError, IntakeResult};
use crate::models::{CandidateFile, Condition, FilePart, NamedBlob, Role, UploadForm};

/// Extensions every submission must include
pub fn required_extensions() -> [&'static str; 3] {
    FilePart::ALL.map(|part| part.extension())
}

/// Required extensions with no matching file in `files`
///
/// Matching is case-insensitive on the last dot-segment of each name.
/// Returns `None` when all required extensions are present.
pub fn missing_extensions<B: NamedBlob>(files: &[B]) -> Option<Vec<&'static str>> {
    let present: Vec<String> = files.iter().filter_map(|f| f.extension()).collect();

    let missing: Vec<&'static str> = required_extensions()
        .into_iter()
        .filter(|ext| !present.iter().any(|p| p == ext))
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(missing)
    }
}

/// Role a file name qualifies for, if any
///
/// The extension (exact, case-sensitive suffix) picks the file part; the
/// `restEO`/`restEC` substring picks the condition, `restEO` checked first.
pub fn role_for_name(name: &str) -> Option<Role> {
    let condition = Condition::ALL
        .into_iter()
        .find(|c| name.contains(c.marker()))?;
    let part = FilePart::ALL
        .into_iter()
        .find(|p| name.ends_with(p.extension()))?;
    Some(Role::new(part, condition))
}

/// Assign each file in `files` to a role
///
/// Pure function of the list. When two files qualify for the same role the
/// later one occupies it and the earlier one is recorded as superseded.
pub fn classify_by_role<B: NamedBlob>(files: &[B]) -> RoleAssignment {
    let mut assignment = RoleAssignment::default();

    for (index, file) in files.iter().enumerate() {
        match role_for_name(file.name()) {
            Some(role) => {
                if let Some(previous) = assignment.slots[role.index()].replace(index) {
                    tracing::debug!(
                        role = %role,
                        previous = previous,
                        index = index,
                        "Role already filled, later file takes it"
                    );
                    assignment.superseded.push(previous);
                }
            }
            None => assignment.unassigned.push(index),
        }
    }

    assignment
}

/// Mapping from the six roles to positions in the intake list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    slots: [Option<usize>; 6],
    unassigned: Vec<usize>,
    superseded: Vec<usize>,
}

impl RoleAssignment {
    /// List index of the file filling `role`
    pub fn get(&self, role: Role) -> Option<usize> {
        self.slots[role.index()]
    }

    /// Roles with no file, in wire order
    pub fn missing_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Indices of files matching no role pattern
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Indices of files displaced by a later file for the same role
    pub fn superseded(&self) -> &[usize] {
        &self.superseded
    }

    /// Collect the six assigned files for upload
    pub fn upload_form(&self, files: &[CandidateFile]) -> IntakeResult<UploadForm> {
        let missing = self.missing_roles();
        if !missing.is_empty() {
            return Err(IntakeError::MissingRole(missing));
        }

        let mut parts = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let file = self
                .get(role)
                .and_then(|index| files.get(index))
                .ok_or_else(|| IntakeError::MissingRole(vec![role]))?;
            parts.push(file.clone());
        }

        let parts: [CandidateFile; 6] = parts
            .try_into()
            .map_err(|_| IntakeError::MissingRole(Role::ALL.to_vec()))?;
        Ok(UploadForm::new(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<CandidateFile> {
        names
            .iter()
            .map(|n| CandidateFile::new(*n, n.as_bytes().to_vec()))
            .collect()
    }

    fn full_set() -> Vec<CandidateFile> {
        files(&[
            "sub1_restEO.vhdr",
            "sub1_restEO.vmrk",
            "sub1_restEO.eeg",
            "sub1_restEC.vhdr",
            "sub1_restEC.vmrk",
            "sub1_restEC.eeg",
        ])
    }

    #[test]
    fn test_required_extensions() {
        assert_eq!(required_extensions(), [".vhdr", ".vmrk", ".eeg"]);
    }

    #[test]
    fn test_missing_extensions_none_when_all_present() {
        let list = files(&["a.vhdr", "b.VMRK", "c.Eeg"]);
        assert_eq!(missing_extensions(&list), None);
    }

    #[test]
    fn test_missing_extensions_reports_exact_subset() {
        let list = files(&["a.vhdr", "notes.txt"]);
        assert_eq!(missing_extensions(&list), Some(vec![".vmrk", ".eeg"]));

        let empty: Vec<CandidateFile> = Vec::new();
        assert_eq!(
            missing_extensions(&empty),
            Some(vec![".vhdr", ".vmrk", ".eeg"])
        );
    }

    #[test]
    fn test_missing_extensions_uses_last_segment_only() {
        let list = files(&["a.vhdr.bak", "b.vmrk", "c.eeg"]);
        assert_eq!(missing_extensions(&list), Some(vec![".vhdr"]));
    }

    #[test]
    fn test_dotless_name_counts_as_extension_but_fills_no_role() {
        let list = files(&["sub1_restEO.vhdr", "sub1_restEO.vmrk", "eeg"]);
        assert_eq!(missing_extensions(&list), None);
        assert_eq!(classify_by_role(&list).get(Role::ALL[2]), None);
    }

    #[test]
    fn test_role_for_name() {
        assert_eq!(
            role_for_name("sub1_restEO.vhdr"),
            Some(Role::new(FilePart::Header, Condition::EyesOpen))
        );
        assert_eq!(
            role_for_name("x_restEC_run2.eeg"),
            Some(Role::new(FilePart::Data, Condition::EyesClosed))
        );
        assert_eq!(role_for_name("sub1_task.vhdr"), None);
        assert_eq!(role_for_name("sub1_restEO.txt"), None);
        // Role matching is case-sensitive, unlike extension presence
        assert_eq!(role_for_name("sub1_restEO.VHDR"), None);
        assert_eq!(role_for_name("sub1_resteo.vhdr"), None);
    }

    #[test]
    fn test_name_with_both_markers_is_eyes_open() {
        assert_eq!(
            role_for_name("restEC_vs_restEO.vmrk"),
            Some(Role::new(FilePart::Marker, Condition::EyesOpen))
        );
    }

    #[test]
    fn test_full_set_is_complete() {
        let list = full_set();
        let assignment = classify_by_role(&list);

        assert!(assignment.is_complete());
        assert!(assignment.missing_roles().is_empty());
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(assignment.get(*role), Some(i));
        }
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut list = full_set();
        list.reverse();
        let assignment = classify_by_role(&list);

        assert!(assignment.is_complete());
        assert_eq!(assignment.get(Role::ALL[0]), Some(5));
    }

    #[test]
    fn test_eyes_open_only_misses_closed_roles() {
        let list = files(&["sub1_restEO.vhdr", "sub1_restEO.vmrk", "sub1_restEO.eeg"]);

        assert_eq!(missing_extensions(&list), None);

        let assignment = classify_by_role(&list);
        assert!(!assignment.is_complete());
        assert_eq!(assignment.missing_roles(), Role::ALL[3..].to_vec());
    }

    #[test]
    fn test_unmatched_files_are_unassigned() {
        let list = files(&["readme.vhdr", "sub1_restEO.vhdr"]);
        let assignment = classify_by_role(&list);

        assert_eq!(assignment.unassigned(), &[0]);
        assert_eq!(assignment.get(Role::ALL[0]), Some(1));
    }

    #[test]
    fn test_later_duplicate_takes_role() {
        let list = files(&["a_restEO.eeg", "b_restEO.eeg"]);
        let assignment = classify_by_role(&list);

        assert_eq!(assignment.get(Role::ALL[2]), Some(1));
        assert_eq!(assignment.superseded(), &[0]);
    }

    #[test]
    fn test_upload_form_in_wire_order() {
        let mut list = full_set();
        list.swap(0, 5);
        let form = classify_by_role(&list).upload_form(&list).unwrap();

        let names: Vec<&str> = form.parts().map(|(_, f)| f.name()).collect();
        assert_eq!(
            names,
            [
                "sub1_restEO.vhdr",
                "sub1_restEO.vmrk",
                "sub1_restEO.eeg",
                "sub1_restEC.vhdr",
                "sub1_restEC.vmrk",
                "sub1_restEC.eeg",
            ]
        );
        assert_eq!(form.role_names().get(Role::ALL[4]), "sub1_restEC.vmrk");
    }

    #[test]
    fn test_upload_form_rejects_incomplete() {
        let list = files(&["sub1_restEO.vhdr"]);
        let result = classify_by_role(&list).upload_form(&list);
        assert!(matches!(result, Err(IntakeError::MissingRole(roles)) if roles.len() == 5));
    }
}

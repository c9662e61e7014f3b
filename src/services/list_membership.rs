use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{ListAction, MemberId},
};

/// Computes the next state of an id list.
///
/// All ids are compared by their canonical string form, so `205` and `"205"`
/// are the same member. The result never holds duplicates: existing entries
/// keep their first-seen order and an added candidate goes last. Both actions
/// are idempotent.
pub fn reconcile(current: &[MemberId], candidate: &MemberId, action: ListAction) -> Vec<String> {
    let candidate = candidate.canonical();

    let mut seen = HashSet::with_capacity(current.len() + 1);
    let mut next: Vec<String> = current
        .iter()
        .map(MemberId::canonical)
        .filter(|id| seen.insert(id.clone()))
        .collect();

    match action {
        ListAction::Add => {
            if seen.insert(candidate.clone()) {
                next.push(candidate);
            }
        }
        ListAction::Remove => next.retain(|id| *id != candidate),
    }

    next
}

/// Same as [`reconcile`], with the action still in its textual form.
///
/// Anything other than `add` or `remove` fails with `InvalidArgument`.
pub fn reconcile_with_action(
    current: &[MemberId],
    candidate: &MemberId,
    action: &str,
) -> AppResult<Vec<String>> {
    let action = action.parse::<ListAction>()?;
    Ok(reconcile(current, candidate, action))
}

/// Lifts stored string ids into reconciler input.
pub fn members(ids: &[String]) -> Vec<MemberId> {
    ids.iter().cloned().map(MemberId::Text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn nums(ids: &[i64]) -> Vec<MemberId> {
        ids.iter().copied().map(MemberId::from).collect()
    }

    fn texts(ids: &[&str]) -> Vec<MemberId> {
        ids.iter().copied().map(MemberId::from).collect()
    }

    #[test]
    fn test_add_to_empty() {
        let next = reconcile(&[], &"55".into(), ListAction::Add);
        assert_eq!(next, vec!["55"]);

        let again = reconcile(&members(&next), &"55".into(), ListAction::Add);
        assert_eq!(again, vec!["55"]);
    }

    #[test]
    fn test_remove_numeric_candidate_from_strings() {
        let next = reconcile(
            &texts(&["101", "205"]),
            &MemberId::number(205),
            ListAction::Remove,
        );
        assert_eq!(next, vec!["101"]);
    }

    #[test]
    fn test_add_string_equivalent_of_number_is_noop() {
        let next = reconcile(&nums(&[1, 2, 3]), &"2".into(), ListAction::Add);
        assert_eq!(next, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_add_appends_new_member() {
        let next = reconcile(&nums(&[1, 2]), &MemberId::number(3), ListAction::Add);
        assert_eq!(next, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let next = reconcile(&texts(&["1", "2"]), &"9".into(), ListAction::Remove);
        assert_eq!(next, vec!["1", "2"]);
    }

    #[test]
    fn test_existing_duplicates_collapse() {
        let current = vec![
            MemberId::number(7),
            MemberId::Text("7".to_string()),
            MemberId::Text(" 8".to_string()),
            MemberId::number(8),
        ];
        let next = reconcile(&current, &MemberId::number(9), ListAction::Add);
        assert_eq!(next, vec!["7", "8", "9"]);
    }

    #[test]
    fn test_remove_drops_every_representation() {
        let current = vec![MemberId::number(7), MemberId::Text("7".to_string())];
        assert!(reconcile(&current, &"7".into(), ListAction::Remove).is_empty());
    }

    #[test]
    fn test_idempotence() {
        let sets = [nums(&[]), nums(&[1, 2, 3]), texts(&["4", "x", "4"])];
        let candidates = [MemberId::number(2), "x".into(), MemberId::number(99)];

        for set in &sets {
            for x in &candidates {
                for action in [ListAction::Add, ListAction::Remove] {
                    let once = reconcile(set, x, action);
                    let twice = reconcile(&members(&once), x, action);
                    assert_eq!(once, twice, "{:?} {:?} {:?}", set, x, action);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let current = texts(&["c", "a", "b"]);
        let first = reconcile(&current, &"d".into(), ListAction::Add);
        let second = reconcile(&current, &"d".into(), ListAction::Add);
        assert_eq!(first, second);
        assert_eq!(first, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = reconcile_with_action(&nums(&[1]), &MemberId::number(1), "toggle");
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_textual_action_accepted() {
        let next = reconcile_with_action(&nums(&[1]), &MemberId::number(2), "add").unwrap();
        assert_eq!(next, vec!["1", "2"]);
    }
}

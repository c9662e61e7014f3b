use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Comment, CommentNode};

/// Builds the reply forest for a flat batch of comments.
///
/// Roots are comments without a parent in the batch, newest first. Replies
/// are ordered oldest first at every depth. Comments whose parent is missing
/// from the batch are promoted to roots rather than dropped.
///
/// Malformed input is resolved without error:
/// - duplicate ids: the last occurrence owns the id, earlier ones are still
///   placed by their own `parent_id`
/// - a comment naming itself as parent is a root
/// - a longer parent cycle is broken at the first member reached while
///   walking ancestors in input order
///
/// Every input comment appears exactly once in the output. Ties on
/// `created_at` keep input order.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let index: HashMap<&str, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut parents: Vec<Option<usize>> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.parent_id
                .as_deref()
                .and_then(|pid| index.get(pid).copied())
                .filter(|&p| p != i)
        })
        .collect();

    break_cycles(&mut parents);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    roots.sort_by_key(|&i| Reverse(comments[i].created_at));
    for siblings in children.iter_mut() {
        siblings.sort_by_key(|&i| comments[i].created_at);
    }

    assemble(comments, &roots, &mut children)
}

/// Detaches one member of every parent cycle so the links form a forest.
/// Each comment is visited a bounded number of times.
fn break_cycles(parents: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        let mut current = Some(start);
        while let Some(i) = current {
            match marks[i] {
                Mark::Done => break,
                Mark::OnPath => {
                    tracing::warn!(
                        comment_index = i,
                        "Comment parent cycle detected, promoting to root"
                    );
                    parents[i] = None;
                    break;
                }
                Mark::Unvisited => {
                    marks[i] = Mark::OnPath;
                    path.push(i);
                    current = parents[i];
                }
            }
        }
        for i in path.drain(..) {
            marks[i] = Mark::Done;
        }
    }
}

/// Materializes nodes bottom-up so arbitrarily deep threads do not recurse.
fn assemble(
    comments: &[Comment],
    roots: &[usize],
    children: &mut [Vec<usize>],
) -> Vec<CommentNode> {
    // Pre-order walk: every parent precedes its descendants.
    let mut order = Vec::with_capacity(comments.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev().copied());
    }

    let mut built: Vec<Option<CommentNode>> = vec![None; comments.len()];
    for &i in order.iter().rev() {
        let replies = std::mem::take(&mut children[i])
            .into_iter()
            .filter_map(|child| built[child].take())
            .collect();
        built[i] = Some(CommentNode {
            comment: comments[i].clone(),
            replies,
        });
    }

    roots.iter().filter_map(|&i| built[i].take()).collect()
}

/// Caps nesting at `max_depth` levels below the roots.
///
/// A node at `max_depth` keeps all of its descendants as direct replies,
/// oldest first. Threads already within the limit are left unchanged.
pub fn limit_depth(roots: &mut [CommentNode], max_depth: usize) {
    let mut stack: Vec<(&mut CommentNode, usize)> = roots.iter_mut().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        if depth < max_depth {
            stack.extend(node.replies.iter_mut().map(|n| (n, depth + 1)));
            continue;
        }
        if node.replies.iter().all(|r| r.replies.is_empty()) {
            continue;
        }

        // Pre-order so equal timestamps keep thread order after the sort.
        let mut flat = Vec::new();
        let mut pending: Vec<CommentNode> = std::mem::take(&mut node.replies);
        pending.reverse();
        while let Some(mut reply) = pending.pop() {
            let mut nested = std::mem::take(&mut reply.replies);
            nested.reverse();
            pending.append(&mut nested);
            flat.push(reply);
        }
        flat.sort_by_key(|r| r.comment.created_at);
        node.replies = flat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, Subject};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn comment(id: &str, parent_id: Option<&str>, day: u32) -> Comment {
        Comment {
            id: id.to_string(),
            subject: Subject::new(MediaType::Movie, 27205),
            parent_id: parent_id.map(str::to_string),
            author_id: "cobb".to_string(),
            text: format!("comment {}", id),
            liked_by_ids: Vec::new(),
            created_at: at(day),
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.comment.id.as_str()).collect()
    }

    fn total(nodes: &[CommentNode]) -> usize {
        nodes.iter().map(CommentNode::subtree_size).sum()
    }

    #[test]
    fn test_empty_input() {
        assert!(build_comment_tree(&[]).is_empty());
    }

    #[test]
    fn test_single_reply_nested_under_parent() {
        let comments = vec![comment("a", None, 1), comment("b", Some("a"), 2)];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree), vec!["a"]);
        assert_eq!(ids(&tree[0].replies), vec!["b"]);
        assert!(tree[0].replies[0].replies.is_empty());
    }

    #[test]
    fn test_roots_newest_first() {
        let comments = vec![
            comment("t1", None, 1),
            comment("t3", None, 3),
            comment("t2", None, 2),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree), vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn test_replies_oldest_first() {
        let comments = vec![
            comment("p", None, 1),
            comment("c3", Some("p"), 4),
            comment("c1", Some("p"), 2),
            comment("c2", Some("p"), 3),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree[0].replies), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_nested_replies_sorted_at_every_depth() {
        let comments = vec![
            comment("root", None, 1),
            comment("mid", Some("root"), 2),
            comment("late", Some("mid"), 9),
            comment("early", Some("mid"), 5),
        ];

        let tree = build_comment_tree(&comments);

        let mid = &tree[0].replies[0];
        assert_eq!(mid.comment.id, "mid");
        assert_eq!(ids(&mid.replies), vec!["early", "late"]);
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let comments = vec![
            comment("a", None, 1),
            comment("orphan", Some("missing-id"), 2),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree), vec!["orphan", "a"]);
    }

    #[test]
    fn test_children_arriving_before_parent() {
        let comments = vec![
            comment("b", Some("a"), 2),
            comment("c", Some("b"), 3),
            comment("a", None, 1),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree), vec!["a"]);
        assert_eq!(ids(&tree[0].replies), vec!["b"]);
        assert_eq!(ids(&tree[0].replies[0].replies), vec!["c"]);
    }

    #[test]
    fn test_self_parent_is_root() {
        let comments = vec![comment("loop", Some("loop"), 1)];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree), vec!["loop"]);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn test_two_node_cycle_terminates_and_keeps_everything() {
        let comments = vec![comment("x", Some("y"), 1), comment("y", Some("x"), 2)];

        let tree = build_comment_tree(&comments);

        assert_eq!(total(&tree), 2);
        assert_eq!(tree.len(), 1);
        // Walking from "x" reaches "x" again first, so it becomes the root.
        assert_eq!(ids(&tree), vec!["x"]);
        assert_eq!(ids(&tree[0].replies), vec!["y"]);
    }

    #[test]
    fn test_cycle_hanging_below_a_tail() {
        let comments = vec![
            comment("tail", Some("p"), 1),
            comment("p", Some("q"), 2),
            comment("q", Some("p"), 3),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(total(&tree), 3);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_last_write_wins() {
        let comments = vec![
            comment("dup", None, 1),
            comment("dup", None, 2),
            comment("reply", Some("dup"), 3),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(total(&tree), 3);
        assert_eq!(tree.len(), 2);
        // Newest root is the second "dup", which owns the reply.
        assert_eq!(tree[0].comment.created_at, at(2));
        assert_eq!(ids(&tree[0].replies), vec!["reply"]);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let comments = vec![
            comment("p", None, 1),
            comment("first", Some("p"), 2),
            comment("second", Some("p"), 2),
        ];

        let tree = build_comment_tree(&comments);

        assert_eq!(ids(&tree[0].replies), vec!["first", "second"]);
    }

    #[test]
    fn test_input_not_mutated_and_output_deterministic() {
        let comments = vec![
            comment("a", None, 1),
            comment("b", Some("a"), 3),
            comment("c", Some("a"), 2),
            comment("d", None, 4),
        ];
        let snapshot = comments.clone();

        let first = build_comment_tree(&comments);
        let second = build_comment_tree(&comments);

        assert_eq!(comments, snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_comment_appears_once() {
        let comments: Vec<Comment> = (0..50u32)
            .map(|i| {
                let parent = match i % 4 {
                    0 => None,
                    1 => Some(format!("c{}", i / 2)),
                    2 => Some("nowhere".to_string()),
                    _ => Some(format!("c{}", i - 1)),
                };
                let mut c = comment(&format!("c{}", i), None, 1 + i % 28);
                c.parent_id = parent;
                c
            })
            .collect();

        let tree = build_comment_tree(&comments);

        assert_eq!(total(&tree), comments.len());
    }

    fn chain(depth: usize) -> Vec<Comment> {
        (0..depth)
            .map(|i| {
                let parent = (i > 0).then(|| format!("n{}", i - 1));
                let mut c = comment(&format!("n{}", i), None, 1);
                c.parent_id = parent;
                c
            })
            .collect()
    }

    fn depth_of(tree: &[CommentNode]) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&CommentNode, usize)> = tree.iter().map(|n| (n, 1)).collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.replies.iter().map(|n| (n, depth + 1)));
        }
        deepest
    }

    #[test]
    fn test_deep_chain_builds_and_drops() {
        let depth = 100_000;
        let tree = build_comment_tree(&chain(depth));

        assert_eq!(tree.len(), 1);
        assert_eq!(depth_of(&tree), depth);
        drop(tree);
    }

    #[test]
    fn test_limited_deep_chain_serializes() {
        let comments = chain(10_000);
        let mut tree = build_comment_tree(&comments);

        limit_depth(&mut tree, 8);

        assert_eq!(depth_of(&tree), 10);
        assert_eq!(total(&tree), comments.len());

        let json = serde_json::to_value(&tree).unwrap();
        let mut node = &json[0];
        for _ in 0..8 {
            node = &node["replies"][0];
        }
        let flat = node["replies"].as_array().unwrap();
        assert_eq!(flat.len(), 10_000 - 9);
        assert_eq!(flat[0]["id"], "n9");
        assert_eq!(flat[flat.len() - 1]["id"], "n9999");
        assert!(flat.iter().all(|r| r["replies"] == serde_json::json!([])));
    }

    #[test]
    fn test_limit_depth_orders_flattened_replies_oldest_first() {
        let comments = vec![
            comment("root", None, 1),
            comment("a", Some("root"), 2),
            comment("a1", Some("a"), 5),
            comment("b", Some("root"), 3),
            comment("b1", Some("b"), 4),
        ];
        let mut tree = build_comment_tree(&comments);

        limit_depth(&mut tree, 0);

        assert_eq!(ids(&tree[0].replies), vec!["a", "b", "b1", "a1"]);
    }

    #[test]
    fn test_limit_depth_keeps_shallow_threads() {
        let comments = vec![
            comment("root", None, 1),
            comment("a", Some("root"), 2),
            comment("a1", Some("a"), 3),
        ];
        let mut tree = build_comment_tree(&comments);
        let before = tree.clone();

        limit_depth(&mut tree, 2);

        assert_eq!(tree, before);
    }
}

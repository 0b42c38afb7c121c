//! Folding of source documents into a single tree.
//!
//! Objects are merged recursively; every other combination, arrays and
//! nulls included, is resolved by taking the later value whole.

use super::node::Node;

/// Merges documents in order, later documents taking precedence.
///
/// No documents yield an empty object; a single document is returned as is.
pub fn merge<I>(documents: I) -> Node
where
    I: IntoIterator<Item = Node>,
{
    let mut documents = documents.into_iter();
    match documents.next() {
        Some(first) => documents.fold(first, combine),
        None => Node::empty_object(),
    }
}

/// Combines two documents, `right` overriding `left`.
pub fn combine(left: Node, right: Node) -> Node {
    match (left, right) {
        (Node::Object(mut base), Node::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => combine(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Node::Object(base)
        }
        (_, right) => right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn test_merge_nothing_is_empty_object() {
        assert_eq!(merge(Vec::new()), Node::empty_object());
    }

    #[test]
    fn test_merge_single_document_unchanged() {
        let doc = node(json!({"a": ["x"]}));
        assert_eq!(merge(vec![doc.clone()]), doc);

        assert_eq!(merge(vec![Node::scalar("s")]), Node::scalar("s"));
    }

    #[test]
    fn test_objects_merge_deeply() {
        let merged = merge(vec![
            node(json!({"a": {"x": 1, "y": 2}})),
            node(json!({"a": {"y": 3, "z": 4}})),
        ]);

        assert_eq!(merged, node(json!({"a": {"x": 1, "y": 3, "z": 4}})));
    }

    #[test]
    fn test_arrays_replaced_not_concatenated() {
        let merged = merge(vec![node(json!({"a": [1, 2]})), node(json!({"a": [9]}))]);

        assert_eq!(merged, node(json!({"a": [9]})));
    }

    #[test]
    fn test_type_mismatch_takes_right() {
        assert_eq!(
            combine(node(json!({"a": {"b": 1}})), node(json!({"a": "flat"}))),
            node(json!({"a": "flat"}))
        );
        assert_eq!(
            combine(node(json!({"a": "flat"})), node(json!({"a": {"b": 1}}))),
            node(json!({"a": {"b": 1}}))
        );
        assert_eq!(
            combine(node(json!({"a": "x"})), node(json!({"a": null}))),
            node(json!({"a": null}))
        );
    }

    #[test]
    fn test_left_fold_order() {
        let a = node(json!({"k": "a", "only_a": true}));
        let b = node(json!({"k": "b", "nested": {"p": 1}}));
        let c = node(json!({"nested": {"q": 2}, "k": "c"}));

        let folded = combine(combine(a.clone(), b.clone()), c.clone());
        assert_eq!(merge(vec![a, b, c]), folded);
        assert_eq!(folded.get("k"), Some(&Node::scalar("c")));
        assert_eq!(
            folded.get("nested"),
            Some(&node(json!({"p": 1, "q": 2})))
        );
    }

    #[test]
    fn test_source_order_decides_winner() {
        let test1 = node(json!({"a": "b"}));
        let test2 = node(json!({"a": "e", "c": "d"}));

        assert_eq!(
            merge(vec![test1.clone(), test2.clone()]),
            node(json!({"a": "e", "c": "d"}))
        );
        assert_eq!(merge(vec![test2, test1]), node(json!({"a": "b", "c": "d"})));
    }
}

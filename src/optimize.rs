use crate::node::Node;

/// Single post-order constant-folding pass.
///
/// Constants and variables are left alone. An impure node is left alone
/// entirely, its whole subtree included — impurity does not stop at the
/// node itself, it stops recursion from reaching into its children at all.
/// A pure node whose children are all constants after recursion is
/// evaluated exactly once and rewritten in place to [`Node::Constant`],
/// dropping its former children.
pub(crate) fn optimize(node: &mut Node<'_>) {
    match node {
        Node::Constant(_) | Node::Variable(_) => {}
        _ if !node.is_pure() => {}
        _ => {
            for child in node.children_mut() {
                optimize(child);
            }
            let all_constant = node
                .children()
                .iter()
                .all(|c| matches!(c, Node::Constant(_)));
            if all_constant {
                let value = node.eval();
                *node = Node::Constant(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Callable, InfixOp};

    #[test]
    fn folds_pure_constant_subtree() {
        let mut tree = Node::Call {
            callable: Callable::Binary(InfixOp::Add),
            pure: true,
            children: vec![Node::Constant(1.0), Node::Constant(2.0)],
        };
        optimize(&mut tree);
        assert!(matches!(tree, Node::Constant(v) if v == 3.0));
    }

    #[test]
    fn does_not_fold_impure_node() {
        let mut tree = Node::Call {
            callable: Callable::Binary(InfixOp::Add),
            pure: false,
            children: vec![Node::Constant(1.0), Node::Constant(2.0)],
        };
        optimize(&mut tree);
        assert!(matches!(tree, Node::Call { .. }));
    }

    #[test]
    fn impure_node_shields_its_constant_only_subtree() {
        let inner = Node::Call {
            callable: Callable::Binary(InfixOp::Add),
            pure: true,
            children: vec![Node::Constant(1.0), Node::Constant(2.0)],
        };
        let mut tree = Node::Call {
            callable: Callable::Negate,
            pure: false,
            children: vec![inner],
        };
        optimize(&mut tree);
        match &tree {
            Node::Call { children, .. } => {
                assert!(matches!(children[0], Node::Call { .. }), "inner subtree must not be folded");
            }
            _ => panic!("root should not have been folded"),
        }
    }
}

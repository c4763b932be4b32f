use crate::node::Node;
use ptree::{Style, TreeItem};
use std::borrow::Cow;
use std::io;

/// Debug pretty-printer, grounded on the teacher's `ASTNode: TreeItem` impl
/// (`ast_node.rs`): pre-order, indented by depth. Constants print their
/// value, variables print the address of the cell they dereference,
/// callables print their arity followed by their children's addresses —
/// same shape as the original's `pn()`, rendered through `ptree` instead of
/// hand-rolled `printf` indentation.
impl<'a> TreeItem for Node<'a> {
    type Child = Node<'a>;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        match self {
            Node::Constant(v) => write!(f, "{}", v),
            Node::Variable(cell) => write!(f, "bound {:p}", cell),
            Node::Call { children, .. } | Node::Closure { children, .. } => {
                write!(f, "f{}", children.len())?;
                for child in children.iter() {
                    write!(f, " {:p}", child)?;
                }
                Ok(())
            }
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(Node::children(self).to_vec())
    }
}

pub(crate) fn print(root: &Node<'_>) -> io::Result<()> {
    ptree::print_tree(root)
}

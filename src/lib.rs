//! A small library that compiles a textual infix arithmetic expression into
//! an evaluable tree, then evaluates that tree — repeatedly, if desired —
//! against caller-supplied variable bindings.
//!
//! # Overview
//!
//! The language is a conventional infix numeric expression grammar with a
//! fixed library of built-in functions (trigonometry, logarithms,
//! combinatorics) plus an extensibility mechanism that lets callers inject
//! named scalar variables, pure functions, and context-carrying closures of
//! arity 0 through 7.
//!
//! The interesting part is the front-end/back-end pair: a recursive-descent
//! parser builds a typed expression tree, a constant-folding pass optimizes
//! it, and an evaluator dispatches on node arity. Everything is `f64` — no
//! strings, no booleans, no user-defined operators.
//!
//! # Example
//!
//! ```
//! use exprtree::{compile, Bindings};
//! use std::cell::Cell;
//!
//! let x = Cell::new(2.0);
//! let mut bindings = Bindings::new();
//! bindings.push(exprtree::Binding::variable("x", &x));
//!
//! let tree = compile("sqrt(x^2 + 3*x + 2)", &bindings).unwrap();
//! assert_eq!(tree.eval(), (4.0_f64 + 6.0 + 2.0).sqrt());
//!
//! x.set(7.0);
//! assert_eq!(tree.eval(), (49.0_f64 + 21.0 + 2.0).sqrt());
//! ```
//!
//! # License
//! Provided under the MIT license. See [LICENSE](https://github.com/creative-forest/exprtree/blob/main/LICENSE).

mod bindings;
mod builtin;
mod error;
mod lexer;
mod node;
mod optimize;
mod parser;
mod print;

pub use bindings::{Binding, Bindings};
pub use error::{BindingError, CompileError};

use node::Node;
use parser::Parser;

/// A compiled, optimized expression tree.
///
/// Immutable once returned from [`compile`]: many threads may call
/// [`Tree::eval`] on the same tree concurrently, provided every bound
/// variable the tree references is either left alone or protected
/// externally by the caller — this crate performs no locking of its own.
pub struct Tree<'a> {
    root: Node<'a>,
}

impl<'a> Tree<'a> {
    /// Evaluate the tree against the current values of its bound variables.
    ///
    /// Never fails: domain errors from the underlying math functions (e.g.
    /// `log(-1)`, `1/0`) surface as `NaN`/`±inf`, the same as any other
    /// IEEE-754 floating point computation. It is up to the caller to
    /// decide whether a `NaN` result is itself an error.
    pub fn eval(&self) -> f64 {
        self.root.eval()
    }

    /// Pre-order, indented debug dump of the tree: constants print their
    /// value, variables print the address of the cell they dereference, and
    /// callables print their arity followed by their children's addresses.
    pub fn print(&self) -> std::io::Result<()> {
        print::print(&self.root)
    }
}

/// Compile `expression` into an optimized [`Tree`], resolving identifiers
/// against `bindings` first and the built-in table second.
///
/// On success the tree has already been through one constant-folding pass:
/// any subtree with no free variables and only pure operations has been
/// collapsed to a single constant, so repeated [`Tree::eval`] calls see the
/// smallest tree that could possibly produce the result.
///
/// On failure, [`CompileError::position`] is the 1-based byte offset within
/// `expression` where parsing got stuck.
pub fn compile<'a>(expression: &str, bindings: &Bindings<'a>) -> Result<Tree<'a>, CompileError> {
    let mut root = Parser::new(expression, bindings).parse()?;
    optimize::optimize(&mut root);
    Ok(Tree { root })
}

/// Convenience: compile `expression` with no variables and evaluate it in
/// one call.
pub fn interp(expression: &str) -> Result<f64, CompileError> {
    let bindings = Bindings::new();
    Ok(compile(expression, &bindings)?.eval())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn eval(expression: &str) -> f64 {
        interp(expression).unwrap_or_else(|e| panic!("compile error: {}", e))
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("1+2*3"), 7.0);
        assert_eq!(eval("(1+2)*3"), 9.0);
    }

    #[test]
    fn builtins() {
        assert_eq!(eval("sqrt(16) + abs(-3)"), 7.0);
        assert!((eval("pi") - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert_eq!(eval("ncr(5,2)"), 10.0);
        assert_eq!(eval("fac(5)"), 120.0);
    }

    #[test]
    fn list_is_top_level_comma() {
        assert_eq!(eval("1,2,3"), 3.0);
    }

    #[test]
    fn unary_sign_identity() {
        assert_eq!(eval("- - 5"), 5.0);
        assert_eq!(eval("- - - 5"), -5.0);
        assert_eq!(eval("- - - - 5"), 5.0);
    }

    #[cfg(not(feature = "pow-right-assoc"))]
    #[test]
    fn exponent_left_associative_default() {
        assert_eq!(eval("2^3^2"), 64.0);
        assert_eq!(eval("-2^2"), 4.0);
    }

    #[cfg(feature = "pow-right-assoc")]
    #[test]
    fn exponent_right_associative_feature() {
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("-2^2"), -4.0);
    }

    #[test]
    fn variable_transparency() {
        let x = Cell::new(0.0);
        let mut bindings = Bindings::new();
        bindings.push(Binding::variable("x", &x));
        let tree = compile("sin(x)", &bindings).unwrap();
        assert_eq!(tree.eval(), 0.0);
        x.set(std::f64::consts::FRAC_PI_2);
        assert!((tree.eval() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn compile_errors_report_a_position() {
        let bindings = Bindings::new();
        let err = compile("2 +", &bindings).unwrap_err();
        assert!(err.position >= 3, "position was {}", err.position);

        let err = compile("foo(1)", &bindings).unwrap_err();
        assert_eq!(err.position, 1);

        assert!(compile("pow(1)", &bindings).is_err());
    }

    #[test]
    fn domain_edge_cases() {
        assert_eq!(eval("1/0"), f64::INFINITY);
        assert!(eval("log(-1)").is_nan());
    }

    #[test]
    fn first_match_binding_shadows_builtin() {
        let shadow = Cell::new(42.0);
        let mut bindings = Bindings::new();
        bindings.push(Binding::variable("sin", &shadow));
        let tree = compile("sin", &bindings).unwrap();
        assert_eq!(tree.eval(), 42.0);
    }

    #[test]
    fn constant_folding_collapses_constant_only_expressions() {
        let bindings = Bindings::new();
        let tree = compile("1+2*3-4/2", &bindings).unwrap();
        assert!(matches!(tree.root, Node::Constant(v) if v == 5.0));
    }

    #[test]
    fn user_function_and_closure() {
        let mut bindings = Bindings::new();
        bindings.push(Binding::function("double", 1, true, |args| args[0] * 2.0).unwrap());
        assert_eq!(compile("double(21)", &bindings).unwrap().eval(), 42.0);

        let counter = std::rc::Rc::new(Cell::new(0_i64));
        let ctx: std::rc::Rc<dyn std::any::Any> = counter.clone();
        bindings.push(
            Binding::closure("bump", 0, false, ctx, |ctx, _args| {
                let counter = ctx.downcast_ref::<Cell<i64>>().unwrap();
                counter.set(counter.get() + 1);
                counter.get() as f64
            })
            .unwrap(),
        );
        let tree = compile("bump()", &bindings).unwrap();
        assert_eq!(tree.eval(), 1.0);
        assert_eq!(tree.eval(), 2.0);
    }

    #[test]
    fn invalid_arity_is_rejected() {
        assert!(Binding::function("f", 8, true, |_| 0.0).is_err());
    }
}

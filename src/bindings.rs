use crate::error::BindingError;
use crate::node::ClosureCallable;
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

pub(crate) enum BindingKind<'a> {
    Variable(&'a Cell<f64>),
    Function {
        arity: usize,
        pure: bool,
        func: Rc<dyn Fn(&[f64]) -> f64>,
    },
    Closure {
        arity: usize,
        pure: bool,
        func: ClosureCallable,
        context: Rc<dyn Any>,
    },
}

/// One caller-supplied name -> (address, kind, optional context) record.
///
/// The host owns the storage a [`Binding::variable`] refers to; it must
/// remain valid for as long as any tree compiled against it is used.
pub struct Binding<'a> {
    pub(crate) name: String,
    pub(crate) kind: BindingKind<'a>,
}

impl<'a> Binding<'a> {
    /// A bound scalar variable. Evaluation dereferences `cell` every time,
    /// so trees see the caller's current value rather than a snapshot.
    pub fn variable(name: impl Into<String>, cell: &'a Cell<f64>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Variable(cell),
        }
    }

    /// A pure or impure function of `arity` scalar arguments (0..=7).
    pub fn function(
        name: impl Into<String>,
        arity: usize,
        pure: bool,
        func: impl Fn(&[f64]) -> f64 + 'static,
    ) -> Result<Self, BindingError> {
        if arity > 7 {
            return Err(BindingError::InvalidArity(arity));
        }
        Ok(Self {
            name: name.into(),
            kind: BindingKind::Function {
                arity,
                pure,
                func: Rc::new(func),
            },
        })
    }

    /// A pure or impure closure of `arity` scalar arguments (0..=7). `context`
    /// is passed as the first argument to `func` at every evaluation.
    pub fn closure(
        name: impl Into<String>,
        arity: usize,
        pure: bool,
        context: Rc<dyn Any>,
        func: impl Fn(&dyn Any, &[f64]) -> f64 + 'static,
    ) -> Result<Self, BindingError> {
        if arity > 7 {
            return Err(BindingError::InvalidArity(arity));
        }
        Ok(Self {
            name: name.into(),
            kind: BindingKind::Closure {
                arity,
                pure,
                func: Rc::new(func),
                context,
            },
        })
    }
}

/// A flat, caller-owned list of [`Binding`]s, searched linearly and in
/// registration order by the lexer — first match wins, which is the only
/// mechanism a caller has to shadow a built-in (e.g. registering a variable
/// named `sin`).
#[derive(Default)]
pub struct Bindings<'a> {
    pub(crate) entries: Vec<Binding<'a>>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, binding: Binding<'a>) -> &mut Self {
        self.entries.push(binding);
        self
    }

    pub(crate) fn find(&self, name: &str) -> Option<&Binding<'a>> {
        self.entries.iter().find(|b| b.name == name)
    }
}

//! The fixed library of built-in names available to every compiled expression.
//!
//! Entries are kept in alphabetical order by name; [`find`] relies on that
//! order to binary-search the table instead of scanning it linearly.

/// A built-in's underlying callable, keyed by arity.
///
/// Mirrors the original tinyexpr table of function pointers, one variant per
/// arity the built-in library actually uses (0, 1, or 2 arguments).
#[derive(Clone, Copy)]
pub(crate) enum BuiltinKind {
    Fn0(fn() -> f64),
    Fn1(fn(f64) -> f64),
    Fn2(fn(f64, f64) -> f64),
}

impl BuiltinKind {
    pub(crate) fn arity(&self) -> usize {
        match self {
            BuiltinKind::Fn0(_) => 0,
            BuiltinKind::Fn1(_) => 1,
            BuiltinKind::Fn2(_) => 2,
        }
    }
}

pub(crate) struct BuiltinEntry {
    pub(crate) name: &'static str,
    pub(crate) kind: BuiltinKind,
}

fn const_pi() -> f64 {
    std::f64::consts::PI
}

fn const_e() -> f64 {
    std::f64::consts::E
}

/// `n!`, saturating to `+inf` on overflow and returning `NaN` outside the
/// non-negative-integer domain.
fn fac(a: f64) -> f64 {
    if a.fract() != 0.0 || a < 0.0 {
        return f64::NAN;
    }
    if a > u64::MAX as f64 {
        return f64::INFINITY;
    }
    let ua = a as u64;
    let mut result: u64 = 1;
    for i in 1..=ua {
        match result.checked_mul(i) {
            Some(v) => result = v,
            None => return f64::INFINITY,
        }
    }
    result as f64
}

/// `n choose r`, saturating to `+inf` on overflow and returning `NaN` outside
/// the domain (negative, non-integral, or `r > n`).
fn ncr(n: f64, r: f64) -> f64 {
    if n.fract() != 0.0 || r.fract() != 0.0 || n < 0.0 || r < 0.0 || n < r {
        return f64::NAN;
    }
    if n > u64::MAX as f64 || r > u64::MAX as f64 {
        return f64::INFINITY;
    }
    let un = n as u64;
    let mut ur = r as u64;
    if ur > un / 2 {
        ur = un - ur;
    }
    let mut result: u64 = 1;
    for i in 1..=ur {
        let term = un - ur + i;
        match result.checked_mul(term) {
            Some(v) => result = v / i,
            None => return f64::INFINITY,
        }
    }
    result as f64
}

/// `n permute r`, defined as `ncr(n, r) * fac(r)`.
fn npr(n: f64, r: f64) -> f64 {
    ncr(n, r) * fac(r)
}

#[cfg(feature = "log-natural")]
fn log_builtin(a: f64) -> f64 {
    a.ln()
}
#[cfg(not(feature = "log-natural"))]
fn log_builtin(a: f64) -> f64 {
    a.log10()
}

// Must stay in alphabetical order; `find` binary-searches this table.
pub(crate) const BUILTINS: &[BuiltinEntry] = &[
    BuiltinEntry { name: "abs", kind: BuiltinKind::Fn1(f64::abs) },
    BuiltinEntry { name: "acos", kind: BuiltinKind::Fn1(f64::acos) },
    BuiltinEntry { name: "asin", kind: BuiltinKind::Fn1(f64::asin) },
    BuiltinEntry { name: "atan", kind: BuiltinKind::Fn1(f64::atan) },
    BuiltinEntry { name: "atan2", kind: BuiltinKind::Fn2(f64::atan2) },
    BuiltinEntry { name: "ceil", kind: BuiltinKind::Fn1(f64::ceil) },
    BuiltinEntry { name: "cos", kind: BuiltinKind::Fn1(f64::cos) },
    BuiltinEntry { name: "cosh", kind: BuiltinKind::Fn1(f64::cosh) },
    BuiltinEntry { name: "e", kind: BuiltinKind::Fn0(const_e) },
    BuiltinEntry { name: "exp", kind: BuiltinKind::Fn1(f64::exp) },
    BuiltinEntry { name: "fac", kind: BuiltinKind::Fn1(fac) },
    BuiltinEntry { name: "floor", kind: BuiltinKind::Fn1(f64::floor) },
    BuiltinEntry { name: "ln", kind: BuiltinKind::Fn1(f64::ln) },
    BuiltinEntry { name: "log", kind: BuiltinKind::Fn1(log_builtin) },
    BuiltinEntry { name: "log10", kind: BuiltinKind::Fn1(f64::log10) },
    BuiltinEntry { name: "ncr", kind: BuiltinKind::Fn2(ncr) },
    BuiltinEntry { name: "npr", kind: BuiltinKind::Fn2(npr) },
    BuiltinEntry { name: "pi", kind: BuiltinKind::Fn0(const_pi) },
    BuiltinEntry { name: "pow", kind: BuiltinKind::Fn2(f64::powf) },
    BuiltinEntry { name: "sin", kind: BuiltinKind::Fn1(f64::sin) },
    BuiltinEntry { name: "sinh", kind: BuiltinKind::Fn1(f64::sinh) },
    BuiltinEntry { name: "sqrt", kind: BuiltinKind::Fn1(f64::sqrt) },
    BuiltinEntry { name: "tan", kind: BuiltinKind::Fn1(f64::tan) },
    BuiltinEntry { name: "tanh", kind: BuiltinKind::Fn1(f64::tanh) },
];

/// Binary search the built-in table by full-name comparison.
///
/// The original C table disambiguates `sin` from `sinh` by comparing only the
/// candidate's first `len` bytes and then asserting the table entry ends
/// exactly there; a Rust `&str` already carries its own length, so an
/// ordinary string comparison has the identical effect.
pub(crate) fn find(name: &str) -> Option<&'static BuiltinEntry> {
    BUILTINS
        .binary_search_by(|entry| entry.name.cmp(name))
        .ok()
        .map(|i| &BUILTINS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        let names: Vec<_> = BUILTINS.iter().map(|e| e.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn sin_does_not_match_sinh() {
        assert_eq!(find("sin").unwrap().kind.arity(), 1);
        assert!(matches!(find("sin").unwrap().kind, BuiltinKind::Fn1(f) if f as usize == f64::sin as usize));
        assert!(find("si").is_none());
    }

    #[test]
    fn fac_saturates() {
        assert_eq!(fac(5.0), 120.0);
        assert_eq!(fac(0.0), 1.0);
        assert!(fac(-1.0).is_nan());
        assert!(fac(1.5).is_nan());
        assert_eq!(fac(1000.0), f64::INFINITY);
    }

    #[test]
    fn ncr_and_npr() {
        assert_eq!(ncr(5.0, 2.0), 10.0);
        assert_eq!(npr(5.0, 2.0), 20.0);
        assert!(ncr(2.0, 5.0).is_nan());
        assert!(ncr(-1.0, 1.0).is_nan());
    }
}

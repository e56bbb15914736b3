#![forbid(unsafe_code)]

//! Predicate-tree AST for object queries.
//!
//! A query's filter condition arrives as a tree of typed nodes: field
//! references and literal/parameter leaves, comparisons over them, and
//! AND/OR connectives. Everything else a query language can express
//! (arithmetic, `LIKE`, subqueries, ...) is represented by
//! [`Expr::Unsupported`] so the evaluator can give up on that branch without
//! aborting the walk.

use std::fmt;

use rustc_hash::FxHashMap;

/// Comparison operators the evaluator can answer from a secondary index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Operator spelling, used in log events.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// Node kinds the index translation always gives up on.
///
/// These poison their branch for index-derived restriction but do not abort
/// the walk; the caller re-applies the full predicate in memory instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnsupportedKind {
    /// Arithmetic addition.
    Add,
    /// Arithmetic subtraction.
    Sub,
    /// Arithmetic multiplication.
    Mul,
    /// Arithmetic division.
    Div,
    /// Arithmetic modulo.
    Mod,
    /// `CASE` expression.
    Case,
    /// Type cast.
    Cast,
    /// `IN` list membership.
    In,
    /// `IS` test.
    Is,
    /// `IS NOT` test.
    IsNot,
    /// `LIKE` pattern match.
    Like,
    /// Boolean negation.
    Not,
    /// Unary arithmetic negation.
    Neg,
    /// Bitwise complement.
    Com,
    /// Sub-query.
    Subquery,
    /// Free (unbound) variable.
    Variable,
    /// Object-creation / constructor call.
    Creator,
    /// `DISTINCT` marker.
    Distinct,
}

/// Literal value carried by a predicate leaf or bound to a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Text value.
    Str(String),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl Value {
    /// Canonical external string encoding, used as the candidate index key.
    pub fn encode_key(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Boolean predicate tree over the fields of one object type.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Reference to a field of the candidate object.
    Field(String),
    /// Literal operand.
    Literal(Value),
    /// Named parameter, bound to a value at evaluation time.
    Parameter(String),
    /// Comparison between two sub-expressions.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Conjunction of two sub-predicates.
    And(Box<Expr>, Box<Expr>),
    /// Disjunction of two sub-predicates.
    Or(Box<Expr>, Box<Expr>),
    /// Method/function invocation on the candidate object. The arguments may
    /// reference arbitrary object state, so no index can answer this node.
    Invoke {
        /// Receiver expression rendered as text (e.g. a field path).
        target: String,
        /// Invoked method name.
        method: String,
        /// Argument expressions, kept for in-memory re-evaluation.
        args: Vec<Expr>,
    },
    /// Any node kind the index translation cannot answer.
    Unsupported {
        /// Which give-up kind this node is.
        kind: UnsupportedKind,
        /// Child expressions; still walked so their scans and flags happen.
        children: Vec<Expr>,
    },
}

impl Expr {
    /// Field-reference leaf.
    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field(path.into())
    }

    /// Literal leaf.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Named-parameter leaf.
    pub fn param(name: impl Into<String>) -> Self {
        Expr::Parameter(name.into())
    }

    /// Comparison node.
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left == right`
    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Eq, left, right)
    }

    /// `left != right`
    pub fn ne(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Ne, left, right)
    }

    /// `left > right`
    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Gt, left, right)
    }

    /// `left >= right`
    pub fn ge(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Ge, left, right)
    }

    /// `left < right`
    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Lt, left, right)
    }

    /// `left <= right`
    pub fn le(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Le, left, right)
    }

    /// `left && right`
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    /// `left || right`
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// `field LIKE pattern` — always answered in memory.
    pub fn like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Expr::Unsupported {
            kind: UnsupportedKind::Like,
            children: vec![Expr::field(field), Expr::literal(pattern)],
        }
    }

    /// Give-up node of the given kind.
    pub fn unsupported(kind: UnsupportedKind, children: Vec<Expr>) -> Self {
        Expr::Unsupported { kind, children }
    }

    /// Method-invocation node.
    pub fn invoke(
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        Expr::Invoke {
            target: target.into(),
            method: method.into(),
            args,
        }
    }
}

/// Values supplied for the named parameters of one query execution.
#[derive(Clone, Debug, Default)]
pub struct ParamBindings {
    values: FxHashMap<String, Value>,
}

impl ParamBindings {
    /// Empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, consuming and returning `self` for chaining.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Looks up a bound value by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

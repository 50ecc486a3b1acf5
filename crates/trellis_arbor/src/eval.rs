//! Expression evaluation and assignment against the scope tree.
//!
//! Evaluation is tolerant by design: a path that resolves nowhere, an
//! intermediate segment that is not a mapping, or a call to an unknown
//! function all yield `Undefined` rather than failing. The only errors
//! the string-accepting entry points can produce are syntax errors and
//! non-assignable assignment targets. Evaluation never mutates the tree;
//! the digest loop may repeat it freely.

use trellis_loam::{Value, ValueMap};
use trellis_vine::{parse, CallExpr, Expr, PathExpr};

use crate::error::EvalError;
use crate::scope::{ScopeId, ScopeTree};
use crate::Locals;

impl ScopeTree {
    /// Evaluate a parsed expression against `scope`.
    pub fn eval(&self, scope: ScopeId, expr: &Expr) -> Value {
        self.eval_with_locals(scope, expr, &Locals::default())
    }

    /// Evaluate with caller-supplied locals merged over the scope. Locals
    /// take precedence for a path's first segment; this is how computed
    /// values such as an event payload reach a host-specified expression
    /// without the callee declaring parameter order.
    pub fn eval_with_locals(&self, scope: ScopeId, expr: &Expr, locals: &Locals) -> Value {
        match expr {
            Expr::Path(path) => self.eval_path_with_locals(scope, path, locals),
            Expr::Call(call) => self.eval_call(scope, call, locals),
        }
    }

    /// Parse and evaluate expression source text.
    pub fn eval_str(&self, scope: ScopeId, source: &str) -> Result<Value, EvalError> {
        let expr = parse(source)?;
        Ok(self.eval(scope, &expr))
    }

    /// Evaluate a bare property path against `scope` (no locals).
    pub fn eval_path(&self, scope: ScopeId, path: &PathExpr) -> Value {
        self.eval_path_with_locals(scope, path, &Locals::default())
    }

    fn eval_path_with_locals(&self, scope: ScopeId, path: &PathExpr, locals: &Locals) -> Value {
        let head = match locals.get(path.head()) {
            Some(local) => local.clone(),
            None => self.get(scope, path.head()),
        };
        path.tail()
            .iter()
            .fold(head, |value, segment| value.get(segment).clone())
    }

    fn eval_call(&self, scope: ScopeId, call: &CallExpr, locals: &Locals) -> Value {
        let Some(function) = self.lookup_function(scope, &call.callee) else {
            return Value::Undefined;
        };
        let args: Vec<Value> = call
            .args
            .iter()
            .map(|arg| self.eval_path_with_locals(scope, arg, locals))
            .collect();
        function(&args)
    }

    /// Assign `value` to the property path `expr` names, relative to
    /// `scope`. If an ancestor (within isolation limits) already owns the
    /// path's first segment, the write lands there - mirroring prototypal
    /// read semantics; otherwise it lands on `scope` itself. Missing
    /// intermediate mappings are created; non-mapping intermediates are
    /// replaced.
    pub fn assign(&mut self, scope: ScopeId, expr: &Expr, value: Value) -> Result<(), EvalError> {
        let Some(path) = expr.as_path() else {
            return Err(EvalError::NotAssignable {
                expr: expr.to_string(),
            });
        };
        self.assign_path(scope, path, value);
        Ok(())
    }

    /// Path assignment proper. Infallible: a path always has a storage
    /// location, and assignments into destroyed scopes are dropped (a
    /// two-way binding whose far side died mid-digest must not fail).
    pub fn assign_path(&mut self, scope: ScopeId, path: &PathExpr, value: Value) {
        let target = self.lookup_owner(scope, path.head()).unwrap_or(scope);
        let Some(node) = self.scopes.get_mut(&target) else {
            return;
        };

        if path.is_bare() {
            node.properties.insert(path.head().into(), value);
            return;
        }

        let tail = path.tail();
        let mut slot = node
            .properties
            .entry(path.head().into())
            .or_insert_with(empty_map);
        for segment in &tail[..tail.len() - 1] {
            slot = ensure_map(slot).entry(segment.clone()).or_insert_with(empty_map);
        }
        ensure_map(slot).insert(tail[tail.len() - 1].clone(), value);
    }

    /// Parse assignment target source text and assign.
    pub fn assign_str(
        &mut self,
        scope: ScopeId,
        source: &str,
        value: Value,
    ) -> Result<(), EvalError> {
        let expr = parse(source)?;
        self.assign(scope, &expr, value)
    }
}

fn empty_map() -> Value {
    Value::Map(ValueMap::default())
}

/// Replace a non-mapping slot with an empty mapping and hand back the map.
fn ensure_map(slot: &mut Value) -> &mut ValueMap {
    if !matches!(slot, Value::Map(_)) {
        *slot = empty_map();
    }
    match slot {
        Value::Map(map) => map,
        _ => unreachable!(),
    }
}

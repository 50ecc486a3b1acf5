//! The isolate binding compiler.
//!
//! `compile_isolate` turns a set of binding declarations plus the host's
//! attribute values into a wired isolate scope. All parsing happens
//! before the scope is created, so a malformed declaration or attribute
//! never leaves a half-built scope behind. The isolate scope is marked
//! isolated: its lookups never fall through to the host, which is what
//! keeps a component from silently coupling to unrelated host state.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_arbor::{Locals, ScopeId, ScopeTree, WatchCallback, WatcherHandle};
use trellis_loam::{CompactString, FxHashMap, Value};
use trellis_vine::{
    parse, parse_path, parse_template, Expr, PathExpr, TemplateOptions, TextTemplate,
};

use crate::binding::{BindingDecl, BindingDeclarations, BindingMode, HostAttributes};
use crate::error::BindError;

/// A literal-text binding's observation channel: the current rendered
/// string plus direct subscribers, updated by the same watchers that
/// write the isolate property.
struct ChannelInner {
    current: CompactString,
    observers: Vec<Rc<dyn Fn(&str)>>,
}

type TextChannel = Rc<RefCell<ChannelInner>>;

enum CompiledBinding {
    Text {
        channel: TextChannel,
        handles: Vec<WatcherHandle>,
    },
    TwoWay {
        handles: [WatcherHandle; 2],
    },
    Call {
        expr: Expr,
    },
}

/// The compiled result: the isolate scope id plus per-binding handles,
/// including the watchers the compiler installed on the host.
///
/// Dropping this does not tear anything down; the adapter ends the
/// component's life with [`IsolateBindings::unbind`], which removes the
/// host-side watchers along with the scope. A bare
/// [`ScopeTree::destroy`] of the isolate scope would leave the host
/// watchers behind.
pub struct IsolateBindings {
    scope: ScopeId,
    parent: ScopeId,
    bindings: FxHashMap<CompactString, CompiledBinding>,
}

impl std::fmt::Debug for IsolateBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolateBindings")
            .field("scope", &self.scope)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Compile with default interpolation delimiters.
pub fn compile_isolate(
    tree: &mut ScopeTree,
    parent: ScopeId,
    declarations: &BindingDeclarations,
    attributes: &HostAttributes,
) -> Result<IsolateBindings, BindError> {
    compile_isolate_with(tree, parent, declarations, attributes, &TemplateOptions::default())
}

/// Compile an isolate scope under `parent`, wiring each declared binding
/// to its host attribute.
///
/// A declared binding whose host attribute is absent is skipped: missing
/// optional data is tolerated, not fatal. Malformed attributes and
/// unknown modes are compile-time failures and the scope is not created.
pub fn compile_isolate_with(
    tree: &mut ScopeTree,
    parent: ScopeId,
    declarations: &BindingDeclarations,
    attributes: &HostAttributes,
    options: &TemplateOptions,
) -> Result<IsolateBindings, BindError> {
    // Parse pass: no tree mutation until every declaration checks out.
    let mut plans: Vec<(CompactString, Plan)> = Vec::with_capacity(declarations.len());
    for decl in declarations.iter() {
        let Some(source) = attributes.get(&decl.attribute) else {
            continue;
        };
        let plan = match decl.mode {
            BindingMode::LiteralText => {
                Plan::Text(parse_template(source, options).map_err(|e| syntax(decl, e))?)
            }
            BindingMode::TwoWay => Plan::TwoWay(parse_path(source).map_err(|e| syntax(decl, e))?),
            BindingMode::ExpressionCall => Plan::Call(parse(source).map_err(|e| syntax(decl, e))?),
        };
        plans.push((decl.local.clone(), plan));
    }

    // Wiring pass.
    let scope = tree.create_isolate_child(parent);
    let mut bindings = FxHashMap::default();
    for (local, plan) in plans {
        let compiled = match plan {
            Plan::Text(template) => wire_text(tree, parent, scope, &local, template),
            Plan::TwoWay(path) => wire_two_way(tree, parent, scope, &local, path),
            Plan::Call(expr) => CompiledBinding::Call { expr },
        };
        bindings.insert(local, compiled);
    }
    Ok(IsolateBindings {
        scope,
        parent,
        bindings,
    })
}

enum Plan {
    Text(TextTemplate),
    TwoWay(PathExpr),
    Call(Expr),
}

fn syntax(decl: &BindingDecl, source: trellis_vine::ExprError) -> BindError {
    BindError::Syntax {
        local: decl.local.to_string(),
        source,
    }
}

/// Literal text: render once now, then re-render on any embedded path
/// change, writing the isolate property and notifying the channel.
fn wire_text(
    tree: &mut ScopeTree,
    parent: ScopeId,
    scope: ScopeId,
    local: &CompactString,
    template: TextTemplate,
) -> CompiledBinding {
    let template = Rc::new(template);
    let initial = render_template(tree, parent, &template);
    tree.set(scope, local.clone(), Value::Str(initial.clone()));
    let channel = Rc::new(RefCell::new(ChannelInner {
        current: initial,
        observers: Vec::new(),
    }));

    // One re-render callback shared across every embedded path.
    let rerender: WatchCallback = {
        let template = Rc::clone(&template);
        let channel = Rc::clone(&channel);
        let local = local.clone();
        Rc::new(move |tree, _, _| {
            let rendered = render_template(tree, parent, &template);
            tree.set(scope, local.clone(), Value::Str(rendered.clone()));
            notify(&channel, rendered);
        })
    };
    let paths: Vec<PathExpr> = template.paths().cloned().collect();
    let handles = paths
        .into_iter()
        .map(|path| tree.watch_shared(parent, Expr::Path(path), Rc::clone(&rerender)))
        .collect();
    CompiledBinding::Text { channel, handles }
}

/// Two-way: seed the isolate side from the host, then keep both sides in
/// sync with one watcher each. The isolate-side watcher is registered
/// first; convergence is the digest's structural-equality contract.
fn wire_two_way(
    tree: &mut ScopeTree,
    parent: ScopeId,
    scope: ScopeId,
    local: &CompactString,
    path: PathExpr,
) -> CompiledBinding {
    let initial = tree.eval_path(parent, &path);
    tree.set(scope, local.clone(), initial);

    let parent_path = path.clone();
    let isolate_side = tree.watch_expr(
        scope,
        Expr::Path(PathExpr::new([local.as_str()])),
        move |tree, new, _| {
            tree.assign_path(parent, &parent_path, new.clone());
        },
    );

    let local = local.clone();
    let parent_side = tree.watch_expr(parent, Expr::Path(path), move |tree, new, _| {
        tree.set(scope, local.clone(), new.clone());
    });
    CompiledBinding::TwoWay {
        handles: [isolate_side, parent_side],
    }
}

fn render_template(tree: &ScopeTree, scope: ScopeId, template: &TextTemplate) -> CompactString {
    template.render(|path| tree.eval_path(scope, path).render())
}

fn notify(channel: &TextChannel, rendered: CompactString) {
    // Snapshot subscribers so an observer adding another cannot trip the
    // RefCell mid-notification.
    let observers = {
        let mut inner = channel.borrow_mut();
        inner.current = rendered.clone();
        inner.observers.clone()
    };
    for observer in observers {
        observer(&rendered);
    }
}

impl IsolateBindings {
    /// The isolate scope the compiler created.
    #[inline]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The host scope the bindings resolve against.
    #[inline]
    pub fn host(&self) -> ScopeId {
        self.parent
    }

    /// The compiled mode of a binding, if its host attribute was present.
    pub fn mode(&self, name: &str) -> Option<BindingMode> {
        self.bindings.get(name).map(|binding| match binding {
            CompiledBinding::Text { .. } => BindingMode::LiteralText,
            CompiledBinding::TwoWay { .. } => BindingMode::TwoWay,
            CompiledBinding::Call { .. } => BindingMode::ExpressionCall,
        })
    }

    /// Tear the component down: remove every watcher the compiler
    /// registered, on the host side as well as the isolate side, then
    /// destroy the isolate scope. After this the host digests exactly as
    /// it did before the component was compiled, and observation
    /// channels go quiet.
    pub fn unbind(self, tree: &mut ScopeTree) {
        for binding in self.bindings.values() {
            match binding {
                CompiledBinding::Text { handles, .. } => {
                    for &handle in handles {
                        tree.unwatch(handle);
                    }
                }
                CompiledBinding::TwoWay { handles } => {
                    for &handle in handles {
                        tree.unwatch(handle);
                    }
                }
                CompiledBinding::Call { .. } => {}
            }
        }
        tree.destroy(self.scope);
    }

    /// Subscribe to a literal-text binding's computed string without
    /// installing a watcher. The observer fires immediately with the
    /// current value, then again on every change.
    pub fn observe<F>(&self, name: &str, observer: F) -> Result<(), BindError>
    where
        F: Fn(&str) + 'static,
    {
        match self.bindings.get(name) {
            None => Err(BindError::UnknownBinding(name.to_string())),
            Some(CompiledBinding::Text { channel, .. }) => {
                let current = channel.borrow().current.clone();
                observer(&current);
                channel.borrow_mut().observers.push(Rc::new(observer));
                Ok(())
            }
            Some(_) => Err(BindError::NotObservable(name.to_string())),
        }
    }

    /// Invoke an expression-call binding: merge `locals` over the host
    /// scope and evaluate the host expression there. One-directional and
    /// explicit; no watcher is involved.
    ///
    /// The callable lives on this handle rather than as an isolate
    /// property: scope-stored functions are pure `&[Value] -> Value` and
    /// cannot evaluate against live parent state.
    pub fn call(
        &self,
        tree: &ScopeTree,
        name: &str,
        locals: &Locals,
    ) -> Result<Value, BindError> {
        match self.bindings.get(name) {
            None => Err(BindError::UnknownBinding(name.to_string())),
            Some(CompiledBinding::Call { expr }) => {
                Ok(tree.eval_with_locals(self.parent, expr, locals))
            }
            Some(_) => Err(BindError::NotCallable(name.to_string())),
        }
    }
}

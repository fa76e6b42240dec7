//! The scope tree: one node per `Program`/`FuncDecl`, parent-linked for
//! lookup. Nested `BEGIN...END` blocks do not get their own node — all
//! locals of a function live in that function's single scope.

use pasc_util::FxHashMap;

use crate::symbol::{BuiltinType, Symbol};

/// An index into a [`ScopeTree`]'s arena of scopes. Scopes never outlive
/// the tree that owns them, so a plain index (not an `Rc`/`RefCell`) is
/// enough — mirrors the AST's "no owning back-references" discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeId(u32);

struct Scope {
    name: String,
    level: u32,
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
}

/// Owns every [`Scope`] created during one analysis pass, plus the current
/// scope pointer. `enter_scope`/`exit_scope` push and pop that pointer;
/// the scopes themselves are never deallocated mid-analysis since a child
/// scope's symbols may still need to be read after the child closes (e.g.
/// to report what a function's own parameter list looks like).
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Build the tree with a single `global` scope at level 1, pre-seeded
    /// with the `INTEGER`/`REAL` builtin types.
    pub fn new() -> Self {
        let mut global = Scope {
            name: "global".to_string(),
            level: 1,
            parent: None,
            symbols: FxHashMap::default(),
        };
        global
            .symbols
            .insert("INTEGER".to_string(), Symbol::Builtin(BuiltinType::Integer));
        global
            .symbols
            .insert("REAL".to_string(), Symbol::Builtin(BuiltinType::Real));

        Self {
            scopes: vec![global],
            current: ScopeId(0),
        }
    }

    pub fn current_scope_id(&self) -> ScopeId {
        self.current
    }

    pub fn current_level(&self) -> u32 {
        self.scopes[self.current.0 as usize].level
    }

    pub fn current_scope_name(&self) -> &str {
        &self.scopes[self.current.0 as usize].name
    }

    /// Open a new child scope (for a `FuncDecl`) one level deeper than the
    /// scope currently active, and make it current.
    pub fn enter_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let parent = self.current;
        let level = self.scopes[parent.0 as usize].level + 1;
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            name: name.into(),
            level,
            parent: Some(parent),
            symbols: FxHashMap::default(),
        });
        self.current = id;
        id
    }

    /// Close the current scope, returning to its parent. Panics if called
    /// on the global scope — analysis never exits it.
    pub fn exit_scope(&mut self) {
        let parent = self.scopes[self.current.0 as usize]
            .parent
            .expect("cannot exit the global scope");
        self.current = parent;
    }

    /// Define `name` in the current scope. Returns `false` (and does not
    /// overwrite) if `name` is already defined in this exact scope — the
    /// caller is expected to turn that into a duplicate-declaration error.
    pub fn define(&mut self, name: &str, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[self.current.0 as usize];
        if scope.symbols.contains_key(name) {
            return false;
        }
        scope.symbols.insert(name.to_string(), symbol);
        true
    }

    pub fn declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes[self.current.0 as usize]
            .symbols
            .contains_key(name)
    }

    /// Resolve `name` by walking from the current scope up through parent
    /// links to `global`.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = &self.scopes[scope_id.0 as usize];
            if let Some(sym) = scope.symbols.get(name) {
                return Some(sym);
            }
            id = scope.parent;
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

use crate::object::Object;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Shared handle to an environment frame. Closures hold one of these, so a
/// frame lives as long as its longest holder.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    outer: Option<Env>,
    bindings: HashMap<String, Rc<Object>>,
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer: Env) -> Env {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer),
            bindings: HashMap::new(),
        }))
    }

    /// Binds a name in the *current* frame, replacing any previous binding
    /// there. Outer frames are never touched.
    pub fn define(&mut self, name: impl Into<String>, value: Rc<Object>) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up a name in this frame, then outward through the enclosing
    /// frames.
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.bindings.get(name) {
            Some(value) => Some(Rc::clone(value)),
            None => self.outer.as_ref()?.borrow().get(name),
        }
    }

    /// Every name visible from this frame.
    pub fn get_identifiers(&self) -> HashSet<String> {
        let mut identifiers: HashSet<String> = self.bindings.keys().cloned().collect();
        if let Some(outer) = &self.outer {
            identifiers.extend(outer.borrow().get_identifiers());
        }
        identifiers
    }
}

// Bindings may hold closures that capture this frame, so only names are shown.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

//! The lexically-scoped environment chain. Implemented as `Rc<RefCell<EnvironmentNode>>` rather
//! than the arena-of-indices approach elsewhere in this codebase's lineage: a list value returned
//! out of a function or block must keep working after the scope that created it is popped, and
//! shared ownership makes that automatic instead of requiring the arena to outlive every borrow
//! of it. A child only ever holds a reference to its parent, never the reverse, so no cycles form.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::RuntimeValue;

struct Binding {
	value: RuntimeValue,
	mutable: bool,
}

pub struct EnvironmentNode {
	bindings: HashMap<String, Binding>,
	parent: Option<Environment>,
}

#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentNode>>);

impl Environment {
	pub fn root() -> Self {
		Self(Rc::new(RefCell::new(EnvironmentNode { bindings: HashMap::new(), parent: None })))
	}

	pub fn child(parent: &Self) -> Self {
		Self(Rc::new(RefCell::new(EnvironmentNode { bindings: HashMap::new(), parent: Some(parent.clone()) })))
	}

	/// Defines a new binding in this frame. A duplicate name in the *current* scope is a fatal
	/// runtime error per §4.3; the checker should already have caught this, so reaching it at
	/// runtime only happens for programs that bypassed checking.
	pub fn define(&self, name: &str, value: RuntimeValue, mutable: bool) -> anyhow::Result<()> {
		let mut node = self.0.borrow_mut();
		anyhow::ensure!(!node.bindings.contains_key(name), "Duplicate declaration of \"{name}\" in this scope");
		node.bindings.insert(name.to_owned(), Binding { value, mutable });
		Ok(())
	}

	pub fn get(&self, name: &str) -> anyhow::Result<RuntimeValue> {
		let node = self.0.borrow();
		if let Some(binding) = node.bindings.get(name) {
			return Ok(binding.value.clone());
		}
		match &node.parent {
			Some(parent) => parent.get(name),
			None => anyhow::bail!("Undefined variable \"{name}\""),
		}
	}

	/// Walks the chain looking for an existing binding to overwrite. Errors if the name is
	/// unbound anywhere in the chain, or if the binding that was found is immutable.
	pub fn assign(&self, name: &str, value: RuntimeValue) -> anyhow::Result<()> {
		let mut node = self.0.borrow_mut();
		if let Some(binding) = node.bindings.get_mut(name) {
			anyhow::ensure!(binding.mutable, "Cannot assign to immutable variable \"{name}\"");
			binding.value = value;
			return Ok(());
		}
		match &node.parent {
			Some(parent) => parent.assign(name, value),
			None => anyhow::bail!("Undefined variable \"{name}\""),
		}
	}
}

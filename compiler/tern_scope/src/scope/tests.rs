use super::*;
use crate::{BodyId, FunctionValue, ScopeError};
use pretty_assertions::assert_eq;

fn undefined(name: &str) -> ScopeError {
    ScopeError::UndefinedVariable {
        name: Name::new(name),
    }
}

#[test]
fn test_scope_define_get() {
    let scope = Scope::global();
    scope.define("x", Value::int(42));
    assert_eq!(scope.get("x"), Ok(Value::int(42)));
}

#[test]
fn test_child_reads_parent_binding() {
    let global = Scope::global();
    global.define("x", Value::int(1));
    let child = Scope::new(Some(&global));
    assert_eq!(child.get("x"), Ok(Value::int(1)));
}

#[test]
fn test_scope_shadowing() {
    let global = Scope::global();
    global.define("x", Value::int(1));
    let child = global.child();
    child.define("x", Value::int(2));

    // Child's binding shadows parent's, parent untouched
    assert_eq!(child.get("x"), Ok(Value::int(2)));
    assert_eq!(global.get("x"), Ok(Value::int(1)));
}

#[test]
fn test_grandchild_sees_nearest_binding() {
    let global = Scope::global();
    global.define("x", Value::int(1));
    let child = global.child();
    child.define("x", Value::int(2));
    let grandchild = child.child();
    assert_eq!(grandchild.get("x"), Ok(Value::int(2)));
}

#[test]
fn test_get_undefined_fails() {
    let global = Scope::global();
    assert_eq!(global.get("z"), Err(undefined("z")));

    let child = global.child().child();
    assert_eq!(child.get("z"), Err(undefined("z")));
    assert_eq!(child.lookup("z"), None);
}

#[test]
fn test_define_overwrites_locally() {
    let scope = Scope::global();
    scope.define("x", Value::int(1));
    scope.define("x", Value::string("one"));
    assert_eq!(scope.get("x"), Ok(Value::string("one")));
    assert_eq!(scope.local_len(), 1);
}

#[test]
fn test_set_updates_existing_ancestor_binding() {
    let global = Scope::global();
    global.define("n", Value::int(1));
    let middle = global.child();
    let inner = middle.child();

    assert_eq!(inner.set("n", Value::int(2)), Ok(()));

    assert_eq!(inner.get("n"), Ok(Value::int(2)));
    assert_eq!(global.get("n"), Ok(Value::int(2)));
    assert!(!middle.contains_local("n"));
    assert!(!inner.contains_local("n"));
}

#[test]
fn test_set_updates_nearest_shadowing_binding() {
    let global = Scope::global();
    global.define("x", Value::int(1));
    let child = global.child();
    child.define("x", Value::int(10));

    assert_eq!(child.child().set("x", Value::int(11)), Ok(()));

    assert_eq!(child.get("x"), Ok(Value::int(11)));
    assert_eq!(global.get("x"), Ok(Value::int(1)));
}

#[test]
fn test_set_unbound_creates_global_only() {
    let global = Scope::global();
    let middle = global.child();
    let inner = middle.child();

    assert_eq!(inner.set("y", Value::int(5)), Ok(()));

    assert!(global.contains("y"));
    assert!(global.contains_local("y"));
    assert_eq!(global.get("y"), Ok(Value::int(5)));
    assert!(!middle.contains_local("y"));
    assert!(!inner.contains_local("y"));
    assert_eq!(inner.get("y"), Ok(Value::int(5)));
}

#[test]
fn test_set_on_global_creates_binding() {
    let global = Scope::global();
    assert_eq!(global.set("fresh", Value::Bool(true)), Ok(()));
    assert_eq!(global.get("fresh"), Ok(Value::Bool(true)));
}

#[test]
fn test_strict_policy_rejects_undeclared_assignment() {
    let global = Scope::global_with_policy(AssignPolicy::Strict);
    let child = global.child();

    assert_eq!(
        child.set("typo", Value::int(1)),
        Err(ScopeError::UndeclaredAssignment {
            name: Name::new("typo"),
        })
    );
    assert!(!global.contains("typo"));
    assert!(!child.contains("typo"));
}

#[test]
fn test_strict_policy_still_updates_declared() {
    let global = Scope::global_with_policy(AssignPolicy::Strict);
    global.define("x", Value::int(1));
    let child = global.child();

    assert_eq!(child.set("x", Value::int(2)), Ok(()));
    assert_eq!(global.get("x"), Ok(Value::int(2)));
}

#[test]
fn test_children_inherit_policy() {
    let global = Scope::global_with_policy(AssignPolicy::Strict);
    let grandchild = global.child().child();
    assert_eq!(grandchild.assign_policy(), AssignPolicy::Strict);
    assert_eq!(Scope::global().child().assign_policy(), AssignPolicy::CreateGlobal);
}

#[test]
fn test_immutable_binding_rejects_set() {
    let global = Scope::global();
    global.define_with("pi", Value::Float(2.5), Mutability::Immutable);
    let child = global.child();

    assert_eq!(
        child.set("pi", Value::int(3)),
        Err(ScopeError::ImmutableBinding {
            name: Name::new("pi"),
        })
    );
    assert_eq!(global.get("pi"), Ok(Value::Float(2.5)));
    assert_eq!(child.mutability_of("pi"), Some(Mutability::Immutable));
}

#[test]
fn test_mutable_shadow_of_immutable_is_assignable() {
    let global = Scope::global();
    global.define_with("x", Value::int(1), Mutability::Immutable);
    let child = global.child();
    child.define("x", Value::int(2));

    assert_eq!(child.set("x", Value::int(3)), Ok(()));
    assert_eq!(child.get("x"), Ok(Value::int(3)));
    assert_eq!(global.get("x"), Ok(Value::int(1)));
}

#[test]
fn test_contains_walks_whole_chain() {
    let global = Scope::global();
    global.define("g", Value::Void);
    let child = global.child();
    child.define("c", Value::Void);

    assert!(child.contains("g"));
    assert!(child.contains("c"));
    assert!(!global.contains("c"));
    assert!(!child.contains("missing"));
    assert!(!child.contains_local("g"));
}

#[test]
fn test_parent_and_global_scope() {
    let global = Scope::global();
    let child = global.child();
    let grandchild = child.child();

    assert_eq!(global.parent(), None);
    assert_eq!(child.parent(), Some(global.clone()));
    assert_eq!(grandchild.parent(), Some(child.clone()));

    assert_eq!(child.global_scope(), global);
    assert_eq!(grandchild.global_scope(), global);
    assert_eq!(global.global_scope(), global);
    assert_eq!(grandchild.global_scope().parent(), None);
}

#[test]
fn test_depth_and_is_global() {
    let global = Scope::global();
    let child = global.child();
    let grandchild = child.child();

    assert_eq!(global.depth(), 0);
    assert_eq!(child.depth(), 1);
    assert_eq!(grandchild.depth(), 2);
    assert!(global.is_global());
    assert!(!grandchild.is_global());
}

#[test]
fn test_local_names_in_definition_order() {
    let global = Scope::global();
    global.define("outer", Value::Void);
    let scope = global.child();
    scope.define("b", Value::int(1));
    scope.define("a", Value::int(2));
    scope.define("c", Value::int(3));
    // Redefinition keeps the original position
    scope.define("b", Value::int(4));

    assert_eq!(scope.local_names(), vec!["b", "a", "c"]);
    assert_eq!(
        scope.local_bindings(),
        vec![
            (Name::new("b"), Value::int(4)),
            (Name::new("a"), Value::int(2)),
            (Name::new("c"), Value::int(3)),
        ]
    );
}

#[test]
fn test_global_set_appends_to_global_names() {
    let global = Scope::global();
    global.define("first", Value::Void);
    assert_eq!(global.child().set("second", Value::Void), Ok(()));
    assert_eq!(global.local_names(), vec!["first", "second"]);
}

#[test]
fn test_ancestors_innermost_first() {
    let global = Scope::global();
    let child = global.child();
    let grandchild = child.child();

    let chain: Vec<Scope> = grandchild.ancestors().collect();
    assert_eq!(chain, vec![grandchild.clone(), child, global]);
}

#[test]
fn test_scope_equality_is_identity() {
    let a = Scope::global();
    let b = Scope::global();
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn test_closure_keeps_captured_chain_alive() {
    let global = Scope::global();
    let closure = {
        let call = global.child();
        call.define("captured", Value::int(9));
        let block = call.child();
        Value::function(vec![], BodyId::new(1), block)
        // `call` and `block` handles dropped here
    };

    let Value::Function(func) = &closure else {
        panic!("expected function");
    };
    assert_eq!(func.captured().get("captured"), Ok(Value::int(9)));
    assert_eq!(func.captured().depth(), 2);
}

#[test]
fn test_closure_sees_later_assignment_in_captured_scope() {
    let global = Scope::global();
    let outer = global.child();
    outer.define("counter", Value::int(0));
    let closure = FunctionValue::new(vec![], BodyId::new(1), outer.clone());

    assert_eq!(outer.set("counter", Value::int(5)), Ok(()));

    let call = closure.captured().child();
    assert_eq!(call.get("counter"), Ok(Value::int(5)));
}

#[test]
fn test_recursive_closure_in_own_scope_debug_does_not_recurse() {
    let global = Scope::global();
    let func = Value::function(vec![Name::new("n")], BodyId::new(2), global.clone());
    global.define("fact", func);

    let rendered = format!("{global:?}");
    assert_eq!(rendered, "Scope { depth: 0, locals: [Name(\"fact\")] }");
    // Break the cycle so the test does not leak
    global.clear();
}

#[test]
fn test_clear_releases_bindings() {
    let global = Scope::global();
    global.define("a", Value::int(1));
    global.define("b", Value::int(2));
    assert_eq!(global.clear(), 2);
    assert_eq!(global.local_len(), 0);
    assert!(!global.contains("a"));
}

#[test]
fn test_chain_dump() {
    let global = Scope::global();
    global.define("print", Value::Void);
    let child = global.child();
    child.define("x", Value::int(1));
    child.define("y", Value::int(2));

    let dump = child.chain_dump();
    assert_eq!(dump.len(), 2);
    assert_eq!(
        dump.frames()[0],
        ScopeFrame {
            depth: 1,
            names: vec![Name::new("x"), Name::new("y")],
        }
    );
    assert_eq!(
        dump.to_string(),
        "scope chain:\n  1: local [x, y]\n  0: global [print]\n"
    );
}

const DEEP: usize = 100_000;

fn deep_chain(global: &Scope) -> Scope {
    let mut scope = global.clone();
    for _ in 0..DEEP {
        scope = scope.child();
    }
    scope
}

#[test]
fn test_deep_chain_get_set_contains() {
    let global = Scope::global();
    global.define("root", Value::int(1));
    let leaf = deep_chain(&global);

    assert_eq!(leaf.depth(), DEEP);
    assert_eq!(leaf.get("root"), Ok(Value::int(1)));
    assert_eq!(leaf.set("root", Value::int(2)), Ok(()));
    assert_eq!(global.get("root"), Ok(Value::int(2)));
    assert_eq!(leaf.set("made", Value::int(3)), Ok(()));
    assert!(global.contains_local("made"));
    assert!(!leaf.contains("missing"));
    assert_eq!(leaf.global_scope(), global);
}

#[test]
fn test_deep_chain_drops_without_overflow() {
    let global = Scope::global();
    let leaf = deep_chain(&global);
    drop(leaf);
    // Only the caller's handle remains on the global scope
    assert_eq!(global.frame.handle_count(), 1);
}

#[test]
fn test_closure_linked_chain_drops_without_overflow() {
    // Each call scope sits directly under global and binds a closure over
    // the previous call's scope.
    let global = Scope::global();
    let mut prev = global.clone();
    for _ in 0..DEEP {
        let call = global.child();
        call.define("k", Value::function(vec![], BodyId::new(1), prev));
        prev = call;
    }
    assert_eq!(prev.depth(), 1);
    drop(prev);
    assert_eq!(global.frame.handle_count(), 1);
}

#[test]
fn test_list_linked_chain_drops_without_overflow() {
    let global = Scope::global();
    let mut prev = global.clone();
    for _ in 0..DEEP {
        let call = global.child();
        let closure = Value::function(vec![], BodyId::new(1), prev);
        call.define("k", Value::list(vec![Value::int(0), Value::list(vec![closure])]));
        prev = call;
    }
    drop(prev);
    assert_eq!(global.frame.handle_count(), 1);
}

#[test]
fn test_drop_keeps_frames_still_shared() {
    let global = Scope::global();
    let kept = global.child();
    kept.define("x", Value::int(1));
    let holder = global.child();
    holder.define("f", Value::function(vec![], BodyId::new(1), kept.clone()));
    let items = Value::list(vec![Value::function(vec![], BodyId::new(2), kept.clone())]);
    holder.define("items", items.clone());

    drop(holder);
    assert_eq!(kept.get("x"), Ok(Value::int(1)));
    // `kept` plus the closure in the list we still hold
    assert_eq!(kept.frame.handle_count(), 2);
    drop(items);
    assert_eq!(kept.frame.handle_count(), 1);
}

#[test]
fn test_local_scope_clone_shares() {
    let scope1 = LocalScope::new(42);
    let scope2 = scope1.clone();

    *scope1.borrow_mut() = 100;
    assert_eq!(*scope2.borrow(), 100);
    assert!(scope1.ptr_eq(&scope2));
    assert_eq!(scope1.handle_count(), 2);
}

#[test]
fn test_local_scope_try_unwrap() {
    let scope = LocalScope::new(vec![1, 2]);
    let other = scope.clone();
    let Err(scope) = scope.try_unwrap() else {
        panic!("shared scope must not unwrap");
    };
    drop(other);
    assert_eq!(scope.try_unwrap().ok(), Some(vec![1, 2]));
}

#[test]
fn test_local_scope_default_and_deref() {
    let scope: LocalScope<i32> = LocalScope::default();
    let borrowed = scope.deref().borrow();
    assert_eq!(*borrowed, 0);
}

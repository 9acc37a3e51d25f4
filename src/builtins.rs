use std::rc::Rc;

use crate::evaluator::RuntimeError;
use crate::object::{Builtin, BuiltinFunction, Object, ObjectType};

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr) => {
        if $args.len() != $expected {
            return Object::error(RuntimeError::WrongArgumentCount {
                got: $args.len(),
                want: $expected,
            });
        }
    };
}

// Extracts the elements of an array argument or returns a type error
macro_rules! expect_array {
    ($node:expr, $name:expr) => {
        match &*$node {
            Object::Array(elements) => elements,
            other => {
                return Object::error(RuntimeError::ArgumentMustBe {
                    builtin: $name,
                    expected: ObjectType::Array,
                    got: other.object_type(),
                });
            }
        }
    };
}

const BUILTINS: [(&str, BuiltinFunction); 6] = [
    ("len", builtin_len),
    ("puts", builtin_puts),
    ("first", builtin_first),
    ("last", builtin_last),
    ("rest", builtin_rest),
    ("push", builtin_push),
];

/// Finds a builtin by the name it is called with.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS
        .iter()
        .find(|(builtin_name, _)| *builtin_name == name)
        .map(|&(name, func)| Builtin { name, func })
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Element count of an array, character count of a string.
fn builtin_len(args: Vec<Rc<Object>>) -> Rc<Object> {
    check_arity!(args, 1);
    match &*args[0] {
        Object::Array(elements) => Rc::new(Object::Integer(elements.len() as i64)),
        Object::String(value) => Rc::new(Object::Integer(value.chars().count() as i64)),
        other => Object::error(RuntimeError::UnsupportedArgument {
            builtin: "len",
            got: other.object_type(),
        }),
    }
}

fn builtin_puts(args: Vec<Rc<Object>>) -> Rc<Object> {
    for arg in &args {
        println!("{}", arg.inspect());
    }
    Object::null()
}

fn builtin_first(args: Vec<Rc<Object>>) -> Rc<Object> {
    check_arity!(args, 1);
    let elements = expect_array!(args[0], "first");
    elements.first().cloned().unwrap_or_else(Object::null)
}

fn builtin_last(args: Vec<Rc<Object>>) -> Rc<Object> {
    check_arity!(args, 1);
    let elements = expect_array!(args[0], "last");
    elements.last().cloned().unwrap_or_else(Object::null)
}

/// A new array without the first element; `null` for an empty array.
fn builtin_rest(args: Vec<Rc<Object>>) -> Rc<Object> {
    check_arity!(args, 1);
    let elements = expect_array!(args[0], "rest");
    if elements.is_empty() {
        return Object::null();
    }
    Rc::new(Object::Array(elements[1..].to_vec()))
}

/// A new array with the value appended; the argument array is left alone.
fn builtin_push(args: Vec<Rc<Object>>) -> Rc<Object> {
    check_arity!(args, 2);
    let elements = expect_array!(args[0], "push");
    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend(elements.iter().cloned());
    pushed.push(Rc::clone(&args[1]));
    Rc::new(Object::Array(pushed))
}

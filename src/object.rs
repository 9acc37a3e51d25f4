use crate::ast::{BlockStatement, Identifier};
use crate::environment::Env;
use crate::evaluator::RuntimeError;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Runtime type tag; its display form is what error messages print.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Float,
    Boolean,
    String,
    Null,
    ReturnValue,
    Error,
    Function,
    Builtin,
    Array,
    Hash,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Float => "FLOAT",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
        };
        f.write_str(name)
    }
}

/// A runtime value.
///
/// Values are passed around as `Rc<Object>`. Arrays and hashes are never
/// mutated in place; operations that "change" them build a new value.
pub enum Object {
    Integer(i64),
    /// Result of `/`, which divides without truncating.
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
    /// Carries a `return` up to the enclosing call; never escapes the evaluator.
    ReturnValue(Rc<Object>),
    Error(RuntimeError),
    Function(Function),
    Builtin(Builtin),
    Array(Vec<Rc<Object>>),
    Hash(HashObject),
}

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

impl Object {
    /// The shared `true`/`false` instance.
    pub fn bool(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    pub fn error(error: RuntimeError) -> Rc<Object> {
        Rc::new(Object::Error(error))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Float(_) => ObjectType::Float,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
        }
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// `true` for values that must stop evaluation of the enclosing node.
    pub fn is_control(&self) -> bool {
        matches!(self, Object::Error(_) | Object::ReturnValue(_))
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// Structural key for the hashable types (integer, boolean, string).
    pub fn hash_key(&self) -> Option<HashKey> {
        let digest = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::String(value) => {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            object_type: self.object_type(),
            digest,
        })
    }

    /// Identity comparison backing `==`/`!=` on non-numeric, non-string
    /// operands. Booleans and null compare as the singletons they are; every
    /// other value is only equal to itself.
    pub fn is_same(left: &Rc<Object>, right: &Rc<Object>) -> bool {
        match (&**left, &**right) {
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Null, Object::Null) => true,
            _ => Rc::ptr_eq(left, right),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Float(value) => write!(f, "{:?}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => f.write_str(value),
            Object::Null => f.write_str("null"),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(error) => write!(f, "ERROR: {}", error),
            Object::Function(function) => write!(f, "{}", function),
            Object::Builtin(_) => f.write_str("builtin function"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => write!(f, "{}", hash),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.object_type(), self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub digest: u64,
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

/// Hash contents, iterated in the order keys were first inserted.
#[derive(Debug, Clone, Default)]
pub struct HashObject {
    pairs: Vec<HashPair>,
    index: HashMap<HashKey, usize>,
}

impl HashObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; a replaced key keeps its original position.
    pub fn insert(&mut self, hash_key: HashKey, pair: HashPair) {
        match self.index.get(&hash_key) {
            Some(&position) => self.pairs[position] = pair,
            None => {
                self.index.insert(hash_key, self.pairs.len());
                self.pairs.push(pair);
            }
        }
    }

    pub fn get(&self, hash_key: &HashKey) -> Option<&HashPair> {
        self.index.get(hash_key).map(|&position| &self.pairs[position])
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }
}

impl fmt::Display for HashObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", pair.key, pair.value)?;
        }
        write!(f, "}}")
    }
}

/// A closure: parameters and body plus the environment it was defined in.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters: Vec<&str> = self.parameters.iter().map(|p| p.value.as_str()).collect();
        write!(f, "fn({}) {}", parameters.join(", "), self.body)
    }
}

// The captured environment may contain this very function, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

pub type BuiltinFunction = fn(Vec<Rc<Object>>) -> Rc<Object>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(value: &str) -> Object {
        Object::String(value.to_string())
    }

    #[test]
    fn test_string_hash_key() {
        let hello1 = string("Hello World");
        let hello2 = string("Hello World");
        let diff1 = string("My name is johnny");
        let diff2 = string("My name is johnny");

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());
    }

    #[test]
    fn test_hash_keys_are_typed() {
        let one = Object::Integer(1).hash_key().unwrap();
        let yes = Object::Boolean(true).hash_key().unwrap();
        assert_eq!(one.digest, yes.digest);
        assert_ne!(one, yes);
        assert_eq!(Object::Boolean(false).hash_key().unwrap().digest, 0);
    }

    #[test]
    fn test_unhashable() {
        assert!(Object::Null.hash_key().is_none());
        assert!(Object::Float(1.5).hash_key().is_none());
        assert!(Object::Array(vec![]).hash_key().is_none());
    }

    #[test]
    fn test_singletons() {
        assert!(Rc::ptr_eq(&Object::bool(true), &Object::bool(true)));
        assert!(Rc::ptr_eq(&Object::null(), &Object::null()));
        assert!(!Rc::ptr_eq(&Object::bool(true), &Object::bool(false)));
    }

    #[test]
    fn test_identity_equality() {
        let a = Rc::new(Object::Array(vec![]));
        let b = Rc::new(Object::Array(vec![]));
        assert!(Object::is_same(&a, &a.clone()));
        assert!(!Object::is_same(&a, &b));
        assert!(Object::is_same(&Object::null(), &Object::null()));
        assert!(!Object::is_same(&Object::bool(true), &Object::null()));
    }

    #[test]
    fn test_truthiness() {
        assert!(Object::Integer(0).is_truthy());
        assert!(string("").is_truthy());
        assert!(Object::bool(true).is_truthy());
        assert!(!Object::bool(false).is_truthy());
        assert!(!Object::null().is_truthy());
    }

    #[test]
    fn test_inspect() {
        assert_eq!(Object::Integer(-7).inspect(), "-7");
        assert_eq!(Object::Float(2.5).inspect(), "2.5");
        assert_eq!(Object::Float(5.0).inspect(), "5.0");
        assert_eq!(Object::Boolean(false).inspect(), "false");
        assert_eq!(string("hi there").inspect(), "hi there");
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(
            Object::error(RuntimeError::IdentifierNotFound("x".to_string())).inspect(),
            "ERROR: identifier not found: x"
        );
        let array = Object::Array(vec![
            Rc::new(Object::Integer(1)),
            Rc::new(string("two")),
        ]);
        assert_eq!(array.inspect(), "[1, two]");
        assert_eq!(
            Object::ReturnValue(Rc::new(Object::Integer(3))).inspect(),
            "3"
        );
    }

    #[test]
    fn test_hash_keeps_insertion_order() {
        let mut hash = HashObject::new();
        for (key, value) in [("b", 1), ("a", 2), ("b", 3)] {
            let key = Rc::new(string(key));
            let hash_key = key.hash_key().unwrap();
            let value = Rc::new(Object::Integer(value));
            hash.insert(hash_key, HashPair { key, value });
        }
        assert_eq!(hash.len(), 2);
        assert_eq!(hash.to_string(), "{b: 3, a: 2}");
        let missing = string("c").hash_key().unwrap();
        assert!(hash.get(&missing).is_none());
    }
}

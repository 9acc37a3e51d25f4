use crate::ast::{BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement};
use crate::builtins;
use crate::environment::{Env, Environment};
use crate::object::{Function, HashObject, HashPair, Object, ObjectType};
use log::trace;
use std::rc::Rc;
use thiserror::Error;

// --- Evaluation Error ---

/// Runtime failures. They travel as ordinary values inside
/// [`Object::Error`] until they reach the top level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },
    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ObjectType,
    },
    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    ArgumentMustBe {
        builtin: &'static str,
        expected: ObjectType,
        got: ObjectType,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow: {0}")]
    IntegerOverflow(String),
}

// Evaluates a sub-expression and hands an error or return value straight
// back to the caller.
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;
        if value.is_control() {
            return value;
        }
        value
    }};
}

// --- Evaluate Function ---

/// Evaluates a program in `env`.
///
/// Returns `None` when the program produced no value: it was empty, or its
/// last statement was a `let`. A top-level `return` is unwrapped; an error
/// stops evaluation and becomes the result.
pub fn evaluate(program: &Program, env: &Env) -> Option<Rc<Object>> {
    let mut result = None;
    for statement in &program.statements {
        result = eval_statement(statement, env);
        if let Some(value) = &result {
            match &**value {
                Object::ReturnValue(inner) => return Some(Rc::clone(inner)),
                Object::Error(error) => {
                    trace!("evaluation stopped: {}", error);
                    return Some(Rc::clone(value));
                }
                _ => {}
            }
        }
    }
    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Option<Rc<Object>> {
    match statement {
        Statement::Expression { expression, .. } => Some(eval_expression(expression, env)),
        Statement::Return { value, .. } => {
            let value = match value {
                Some(expression) => eval_expression(expression, env),
                None => Object::null(),
            };
            if value.is_control() {
                return Some(value);
            }
            Some(Rc::new(Object::ReturnValue(value)))
        }
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env);
            if value.is_control() {
                return Some(value);
            }
            env.borrow_mut().define(name.value.as_str(), value);
            None
        }
    }
}

/// Runs a block, stopping at the first return value or error, which is
/// passed up still wrapped.
fn eval_block(block: &BlockStatement, env: &Env) -> Option<Rc<Object>> {
    let mut result = None;
    for statement in &block.statements {
        result = eval_statement(statement, env);
        if result.as_ref().is_some_and(|value| value.is_control()) {
            return result;
        }
    }
    result
}

fn eval_expression(expression: &Expression, env: &Env) -> Rc<Object> {
    match expression {
        Expression::IntegerLiteral { value, .. } => Rc::new(Object::Integer(*value)),
        Expression::StringLiteral { value, .. } => Rc::new(Object::String(value.clone())),
        Expression::Boolean { value, .. } => Object::bool(*value),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = propagate!(eval_expression(right, env));
            eval_prefix_expression(*operator, &right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = propagate!(eval_expression(left, env));
            let right = propagate!(eval_expression(right, env));
            eval_infix_expression(*operator, &left, &right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let condition = propagate!(eval_expression(condition, env));
            let branch = if condition.is_truthy() {
                Some(consequence)
            } else {
                alternative.as_ref()
            };
            branch
                .and_then(|block| eval_block(block, env))
                .unwrap_or_else(Object::null)
        }
        Expression::Identifier(identifier) => eval_identifier(identifier, env),
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Rc::new(Object::Function(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            let function = propagate!(eval_expression(function, env));
            let arguments = match eval_expressions(arguments, env) {
                Ok(arguments) => arguments,
                Err(control) => return control,
            };
            apply_function(&function, arguments)
        }
        Expression::ArrayLiteral { elements, .. } => match eval_expressions(elements, env) {
            Ok(elements) => Rc::new(Object::Array(elements)),
            Err(control) => control,
        },
        Expression::Index { left, index, .. } => {
            let left = propagate!(eval_expression(left, env));
            let index = propagate!(eval_expression(index, env));
            eval_index_expression(&left, &index)
        }
        Expression::HashLiteral { pairs, .. } => eval_hash_literal(pairs, env),
    }
}

/// Evaluates left to right, stopping at the first error or return value.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Rc<Object>>, Rc<Object>> {
    let mut values = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_control() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn eval_prefix_expression(operator: PrefixOperator, right: &Rc<Object>) -> Rc<Object> {
    match operator {
        PrefixOperator::Bang => Object::bool(!right.is_truthy()),
        PrefixOperator::Minus => match &**right {
            Object::Integer(value) => match value.checked_neg() {
                Some(negated) => Rc::new(Object::Integer(negated)),
                None => Object::error(RuntimeError::IntegerOverflow(format!("-({})", value))),
            },
            Object::Float(value) => Rc::new(Object::Float(-value)),
            other => Object::error(RuntimeError::UnknownPrefixOperator {
                operator,
                right: other.object_type(),
            }),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: &Rc<Object>, right: &Rc<Object>) -> Rc<Object> {
    match (&**left, &**right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Integer(_) | Object::Float(_), Object::Integer(_) | Object::Float(_)) => {
            eval_float_infix_expression(operator, as_float(left), as_float(right))
        }
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operator, l, r),
        _ if operator == InfixOperator::Eq => Object::bool(Object::is_same(left, right)),
        _ if operator == InfixOperator::NotEq => Object::bool(!Object::is_same(left, right)),
        (l, r) if l.object_type() != r.object_type() => Object::error(RuntimeError::TypeMismatch {
            left: l.object_type(),
            operator,
            right: r.object_type(),
        }),
        (l, r) => Object::error(RuntimeError::UnknownInfixOperator {
            left: l.object_type(),
            operator,
            right: r.object_type(),
        }),
    }
}

fn as_float(object: &Object) -> f64 {
    match object {
        Object::Integer(value) => *value as f64,
        Object::Float(value) => *value,
        _ => f64::NAN,
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> Rc<Object> {
    let checked = match operator {
        InfixOperator::Plus => left.checked_add(right),
        InfixOperator::Minus => left.checked_sub(right),
        InfixOperator::Asterisk => left.checked_mul(right),
        // `/` never truncates
        InfixOperator::Slash => {
            return eval_float_infix_expression(operator, left as f64, right as f64);
        }
        InfixOperator::Lt => return Object::bool(left < right),
        InfixOperator::Gt => return Object::bool(left > right),
        InfixOperator::Eq => return Object::bool(left == right),
        InfixOperator::NotEq => return Object::bool(left != right),
    };
    match checked {
        Some(value) => Rc::new(Object::Integer(value)),
        None => Object::error(RuntimeError::IntegerOverflow(format!(
            "{} {} {}",
            left, operator, right
        ))),
    }
}

fn eval_float_infix_expression(operator: InfixOperator, left: f64, right: f64) -> Rc<Object> {
    match operator {
        InfixOperator::Plus => Rc::new(Object::Float(left + right)),
        InfixOperator::Minus => Rc::new(Object::Float(left - right)),
        InfixOperator::Asterisk => Rc::new(Object::Float(left * right)),
        InfixOperator::Slash if right == 0.0 => Object::error(RuntimeError::DivisionByZero),
        InfixOperator::Slash => Rc::new(Object::Float(left / right)),
        InfixOperator::Lt => Object::bool(left < right),
        InfixOperator::Gt => Object::bool(left > right),
        InfixOperator::Eq => Object::bool(left == right),
        InfixOperator::NotEq => Object::bool(left != right),
    }
}

fn eval_string_infix_expression(operator: InfixOperator, left: &str, right: &str) -> Rc<Object> {
    match operator {
        InfixOperator::Plus => Rc::new(Object::String(format!("{}{}", left, right))),
        _ => Object::error(RuntimeError::UnknownInfixOperator {
            left: ObjectType::String,
            operator,
            right: ObjectType::String,
        }),
    }
}

/// Bindings shadow builtins.
fn eval_identifier(identifier: &Identifier, env: &Env) -> Rc<Object> {
    if let Some(value) = env.borrow().get(&identifier.value) {
        return value;
    }
    match builtins::lookup(&identifier.value) {
        Some(builtin) => Rc::new(Object::Builtin(builtin)),
        None => Object::error(RuntimeError::IdentifierNotFound(identifier.value.clone())),
    }
}

fn apply_function(function: &Rc<Object>, arguments: Vec<Rc<Object>>) -> Rc<Object> {
    match &**function {
        Object::Function(function) => {
            if arguments.len() != function.parameters.len() {
                return Object::error(RuntimeError::WrongArgumentCount {
                    got: arguments.len(),
                    want: function.parameters.len(),
                });
            }
            trace!("calling {} with {} argument(s)", function, arguments.len());
            let call_env = extend_function_env(function, arguments);
            let result = eval_block(&function.body, &call_env);
            unwrap_return_value(result)
        }
        Object::Builtin(builtin) => {
            trace!("calling builtin `{}`", builtin.name);
            (builtin.func)(arguments)
        }
        other => Object::error(RuntimeError::NotAFunction(other.object_type())),
    }
}

/// A fresh frame for one call, enclosed by the environment the function was
/// defined in (not the caller's).
fn extend_function_env(function: &Function, arguments: Vec<Rc<Object>>) -> Env {
    let env = Environment::new_enclosed(Rc::clone(&function.env));
    {
        let mut frame = env.borrow_mut();
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            frame.define(parameter.value.as_str(), argument);
        }
    }
    env
}

// A `return` stops at the function boundary it was raised in.
fn unwrap_return_value(result: Option<Rc<Object>>) -> Rc<Object> {
    match result {
        Some(value) => match &*value {
            Object::ReturnValue(inner) => Rc::clone(inner),
            _ => value,
        },
        None => Object::null(),
    }
}

fn eval_index_expression(left: &Rc<Object>, index: &Rc<Object>) -> Rc<Object> {
    match (&**left, &**index) {
        (Object::Array(elements), Object::Integer(position)) => usize::try_from(*position)
            .ok()
            .and_then(|position| elements.get(position))
            .cloned()
            .unwrap_or_else(Object::null),
        (Object::Hash(hash), key) => match key.hash_key() {
            Some(hash_key) => hash
                .get(&hash_key)
                .map(|pair| Rc::clone(&pair.value))
                .unwrap_or_else(Object::null),
            None => Object::error(RuntimeError::UnusableHashKey(key.object_type())),
        },
        (other, _) => Object::error(RuntimeError::IndexNotSupported(other.object_type())),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> Rc<Object> {
    let mut hash = HashObject::new();
    for (key_expression, value_expression) in pairs {
        let key = propagate!(eval_expression(key_expression, env));
        let Some(hash_key) = key.hash_key() else {
            return Object::error(RuntimeError::UnusableHashKey(key.object_type()));
        };
        let value = propagate!(eval_expression(value_expression, env));
        hash.insert(hash_key, HashPair { key, value });
    }
    Rc::new(Object::Hash(hash))
}

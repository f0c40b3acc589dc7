//! Expression-engine seam.
//!
//! The node never parses or evaluates query expressions itself; it delegates
//! to an [`ExpressionEngine`] supplied by the host. A production host injects
//! a real JSONata engine here. The crate bundles two small engines:
//! [`PointerEngine`], which evaluates RFC 6901 JSON Pointer queries, and
//! [`FakeExpressionEngine`], a scripted double for tests.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by an expression engine.
#[derive(Debug, Error)]
pub enum ExpressionError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// A query expression prepared for repeated evaluation.
///
/// `Ok(None)` means the expression evaluated but produced no value (for a
/// path language, a miss); it is a soft failure, not an error.
pub trait CompiledExpression: Send + Sync + std::fmt::Debug {
    fn evaluate(&self, input: &Value) -> Result<Option<Value>, ExpressionError>;
}

/// Compiles query source text into a [`CompiledExpression`].
pub trait ExpressionEngine: Send + Sync {
    fn prepare(&self, source: &str) -> Result<Box<dyn CompiledExpression>, ExpressionError>;
}

// ================================
// PointerEngine – RFC 6901 JSON Pointer
// ================================

/// Minimal bundled engine: queries are JSON Pointers (`""`, `"/a/b/0"`).
#[derive(Debug, Default, Clone)]
pub struct PointerEngine;

impl PointerEngine {
    pub fn new() -> Self {
        PointerEngine
    }
}

#[derive(Debug)]
struct CompiledPointer {
    pointer: String,
}

impl CompiledExpression for CompiledPointer {
    fn evaluate(&self, input: &Value) -> Result<Option<Value>, ExpressionError> {
        Ok(input.pointer(&self.pointer).cloned())
    }
}

impl ExpressionEngine for PointerEngine {
    fn prepare(&self, source: &str) -> Result<Box<dyn CompiledExpression>, ExpressionError> {
        if !source.is_empty() && !source.starts_with('/') {
            return Err(ExpressionError::Syntax(format!(
                "JSON Pointer must be empty or start with '/': {:?}",
                source
            )));
        }
        // "~" only escapes "~0" (tilde) and "~1" (slash)
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '~' && !matches!(chars.peek(), Some('0') | Some('1')) {
                return Err(ExpressionError::Syntax(format!(
                    "invalid escape in JSON Pointer: {:?}",
                    source
                )));
            }
        }
        Ok(Box::new(CompiledPointer {
            pointer: source.to_string(),
        }))
    }
}

// ================================
// FakeExpressionEngine – scripted test double
// ================================

#[derive(Clone, Debug)]
enum Scripted {
    Value(Value),
    Undefined,
    PrepareError(String),
    EvaluateError(String),
}

/// Scripted engine for tests: map query source text to a canned outcome.
/// Unscripted queries evaluate to no result.
#[derive(Default)]
pub struct FakeExpressionEngine {
    scripts: HashMap<String, Scripted>,
    prepared: Mutex<Vec<String>>,
}

impl FakeExpressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The given query evaluates to `value`.
    pub fn with_result(mut self, source: &str, value: Value) -> Self {
        self.scripts.insert(source.to_string(), Scripted::Value(value));
        self
    }

    /// The given query evaluates to no result.
    pub fn with_undefined(mut self, source: &str) -> Self {
        self.scripts.insert(source.to_string(), Scripted::Undefined);
        self
    }

    /// The given query fails at prepare time with a syntax error.
    pub fn with_prepare_error(mut self, source: &str, error: &str) -> Self {
        self.scripts
            .insert(source.to_string(), Scripted::PrepareError(error.to_string()));
        self
    }

    /// The given query compiles but fails at evaluate time.
    pub fn with_evaluate_error(mut self, source: &str, error: &str) -> Self {
        self.scripts
            .insert(source.to_string(), Scripted::EvaluateError(error.to_string()));
        self
    }

    /// Query sources passed to `prepare`, in call order.
    pub fn prepared(&self) -> Vec<String> {
        self.prepared.lock().clone()
    }
}

#[derive(Debug)]
struct FakeCompiled {
    scripted: Scripted,
}

impl CompiledExpression for FakeCompiled {
    fn evaluate(&self, _input: &Value) -> Result<Option<Value>, ExpressionError> {
        match &self.scripted {
            Scripted::Value(v) => Ok(Some(v.clone())),
            Scripted::Undefined => Ok(None),
            Scripted::EvaluateError(e) => Err(ExpressionError::Evaluation(e.clone())),
            Scripted::PrepareError(e) => Err(ExpressionError::Evaluation(e.clone())),
        }
    }
}

impl ExpressionEngine for FakeExpressionEngine {
    fn prepare(&self, source: &str) -> Result<Box<dyn CompiledExpression>, ExpressionError> {
        self.prepared.lock().push(source.to_string());
        let scripted = self
            .scripts
            .get(source)
            .cloned()
            .unwrap_or(Scripted::Undefined);
        if let Scripted::PrepareError(e) = &scripted {
            return Err(ExpressionError::Syntax(e.clone()));
        }
        Ok(Box::new(FakeCompiled { scripted }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_hit() {
        let engine = PointerEngine::new();
        let expr = engine.prepare("/a/b/1").unwrap();
        let result = expr.evaluate(&json!({"a": {"b": [10, 20]}})).unwrap();
        assert_eq!(result, Some(json!(20)));
    }

    #[test]
    fn pointer_miss_is_soft() {
        let engine = PointerEngine::new();
        let expr = engine.prepare("/missing").unwrap();
        assert_eq!(expr.evaluate(&json!({"a": 1})).unwrap(), None);
    }

    #[test]
    fn pointer_root() {
        let engine = PointerEngine::new();
        let expr = engine.prepare("").unwrap();
        let doc = json!({"a": 1});
        assert_eq!(expr.evaluate(&doc).unwrap(), Some(doc));
    }

    #[test]
    fn pointer_rejects_relative() {
        let engine = PointerEngine::new();
        let err = engine.prepare("a/b").unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax(_)));
    }

    #[test]
    fn pointer_rejects_bad_escape() {
        let engine = PointerEngine::new();
        assert!(engine.prepare("/a~2b").is_err());
        assert!(engine.prepare("/a~").is_err());
        assert!(engine.prepare("/a~0b/~1").is_ok());
    }

    #[test]
    fn fake_records_prepared_sources() {
        let engine = FakeExpressionEngine::new().with_result("a", json!(1));
        let _ = engine.prepare("a").unwrap();
        let _ = engine.prepare("b").unwrap();
        assert_eq!(engine.prepared(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn fake_scripted_outcomes() {
        let engine = FakeExpressionEngine::new()
            .with_result("a+1", json!(2))
            .with_undefined("nothing")
            .with_evaluate_error("boom", "thrown");

        let input = json!({});
        assert_eq!(
            engine.prepare("a+1").unwrap().evaluate(&input).unwrap(),
            Some(json!(2))
        );
        assert_eq!(engine.prepare("nothing").unwrap().evaluate(&input).unwrap(), None);
        assert!(engine.prepare("boom").unwrap().evaluate(&input).is_err());
        // unscripted queries behave like a miss
        assert_eq!(engine.prepare("other").unwrap().evaluate(&input).unwrap(), None);
    }
}

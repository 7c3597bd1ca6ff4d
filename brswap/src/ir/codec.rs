//! JSON codec for Bril programs
//!
//! Decoding validates exactly the fields the rewriter relies on and wraps
//! everything else untouched. Encoding renders with a configurable indent.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use super::types::*;
use crate::{BrswapError, Result};

/// Parse program text
pub fn decode(source: &str) -> Result<Program> {
    let value: Value = serde_json::from_str(source).map_err(BrswapError::Decode)?;
    program_from_value(value)
}

/// Render a program as indented JSON (no trailing newline)
pub fn encode(program: Program, indent: usize) -> Result<String> {
    render(&Value::from(program), indent)
}

/// Render any JSON value with `indent` spaces per level
pub fn render(value: &Value, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).map_err(BrswapError::Encode)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Convert a parsed JSON document into a program
pub fn program_from_value(value: Value) -> Result<Program> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(malformed_program(format!(
                "expected a top-level object, found {}",
                kind(&other)
            )))
        }
    };

    let functions = match fields.get_mut("functions").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(malformed_program(format!(
                "`functions` must be an array, found {}",
                kind(&other)
            )))
        }
        None => return Err(malformed_program("missing `functions` array")),
    };

    let functions = functions
        .into_iter()
        .enumerate()
        .map(|(position, value)| function_from_value(position, value))
        .collect::<Result<Vec<_>>>()?;

    Ok(Program { functions, fields })
}

fn function_from_value(position: usize, value: Value) -> Result<Function> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(malformed_program(format!(
                "function #{} must be an object, found {}",
                position,
                kind(&other)
            )))
        }
    };

    let name = match fields.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(malformed_program(format!(
                "function #{} has no string `name`",
                position
            )))
        }
    };

    let raw = match fields.get_mut("instrs").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(malformed_program(format!(
                "`instrs` of function '{}' must be an array, found {}",
                name,
                kind(&other)
            )))
        }
        None => Vec::new(),
    };

    let mut instrs = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        let inst = instruction_from_value(value).map_err(|message| {
            BrswapError::MalformedRecord {
                function: name.clone(),
                index,
                message,
            }
        })?;
        instrs.push(inst);
    }

    Ok(Function { instrs, fields })
}

/// Classify and validate one instruction record
pub fn instruction_from_value(value: Value) -> std::result::Result<Instruction, String> {
    let fields = match value {
        Value::Object(fields) => fields,
        other => return Err(format!("expected an object, found {}", kind(&other))),
    };

    match fields.get("dest") {
        None | Some(Value::String(_)) => {}
        Some(other) => return Err(format!("`dest` must be a string, found {}", kind(other))),
    }

    if let Some(label) = fields.get("label") {
        if !label.is_string() {
            return Err(format!("`label` must be a string, found {}", kind(label)));
        }
        return Ok(Instruction::Label(Label(fields)));
    }

    let op = match fields.get("op") {
        Some(Value::String(op)) => op.as_str(),
        Some(other) => return Err(format!("`op` must be a string, found {}", kind(other))),
        None => return Err("instruction has neither `op` nor `label`".to_string()),
    };

    if op != BRANCH_OP {
        return Ok(Instruction::Op(Operation(fields)));
    }

    if fields.contains_key("dest") {
        return Err("`br` cannot define a `dest`".to_string());
    }
    match fields.get("labels") {
        Some(Value::Array(labels)) => {
            if let Some(bad) = labels.iter().find(|l| !l.is_string()) {
                return Err(format!("branch label must be a string, found {}", kind(bad)));
            }
        }
        Some(other) => return Err(format!("`labels` must be an array, found {}", kind(other))),
        None => return Err("`br` is missing its `labels`".to_string()),
    }
    Ok(Instruction::Branch(Branch(fields)))
}

fn malformed_program(message: impl Into<String>) -> BrswapError {
    BrswapError::MalformedProgram {
        message: message.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_classifies_instructions() {
        let program = decode(
            r#"{"functions": [{"name": "main", "instrs": [
                {"label": "entry"},
                {"dest": "c", "op": "const", "type": "bool", "value": true},
                {"op": "br", "args": ["c"], "labels": ["a", "b"]},
                {"op": "jmp", "labels": ["a"]}
            ]}]}"#,
        )
        .unwrap();

        let main = &program.functions[0];
        assert_eq!(main.name(), "main");
        assert!(matches!(main.instrs[0], Instruction::Label(_)));
        assert_eq!(main.instrs[1].dest(), Some("c"));
        assert!(main.instrs[2].is_branch());
        // Only `br` is a swappable branch
        assert!(matches!(main.instrs[3], Instruction::Op(_)));
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields_and_order() {
        let source = json!({
            "functions": [{
                "name": "main",
                "args": [{"name": "n", "type": "int"}],
                "instrs": [
                    {"pos": {"row": 1, "col": 2}, "op": "add", "dest": "x", "type": "int", "args": ["n", "n"]},
                    {"value": 1.50, "type": "float", "op": "const", "dest": "f"}
                ],
                "type": "int"
            }],
            "extra": [1, 2, 3]
        });

        let text = source.to_string();
        let program = decode(&text).unwrap();
        let back: Value = serde_json::from_str(&encode(program, 2).unwrap()).unwrap();
        assert_eq!(back, source);
        assert_eq!(
            serde_json::to_string(&back).unwrap(),
            serde_json::to_string(&source).unwrap()
        );
    }

    #[test]
    fn test_number_text_survives() {
        let text = r#"{"functions":[{"name":"main","instrs":[{"dest":"x","op":"const","type":"float","value":2.50}]}]}"#;
        let out = encode(decode(text).unwrap(), 0).unwrap();
        assert!(out.contains("2.50"));
    }

    #[test]
    fn test_missing_instrs_stays_missing() {
        let program = decode(r#"{"functions": [{"name": "empty"}]}"#).unwrap();
        assert!(program.functions[0].instrs.is_empty());
        let back: Value = serde_json::from_str(&encode(program, 2).unwrap()).unwrap();
        assert_eq!(back, json!({"functions": [{"name": "empty"}]}));
    }

    #[test]
    fn test_render_indent() {
        let out = render(&json!({"a": [1]}), 4).unwrap();
        assert_eq!(out, "{\n    \"a\": [\n        1\n    ]\n}");
    }

    #[test]
    fn test_non_string_dest_is_rejected() {
        let err = decode(r#"{"functions": [{"name": "main", "instrs": [{"dest": 3, "op": "const", "value": 1}]}]}"#)
            .unwrap_err();
        match err {
            BrswapError::MalformedRecord { function, index, message } => {
                assert_eq!(function, "main");
                assert_eq!(index, 0);
                assert!(message.contains("`dest` must be a string"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_label_dest_is_checked_and_reserved() {
        let err = instruction_from_value(json!({"label": "l", "dest": 3})).unwrap_err();
        assert!(err.contains("`dest` must be a string"));

        let program = decode(
            r#"{"functions": [{"name": "main", "instrs": [
                {"label": "l", "dest": "v0"},
                {"op": "br", "args": ["c"], "labels": ["a", "b"]}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(program.dests().collect::<Vec<_>>(), vec!["v0"]);
        assert_eq!(crate::ir::FreshNames::new(&program).next_name(), "v1");
    }

    #[test]
    fn test_bad_branch_labels() {
        let err = instruction_from_value(json!({"op": "br", "labels": ["a", 2]})).unwrap_err();
        assert!(err.contains("branch label must be a string"));

        let err = instruction_from_value(json!({"op": "br", "args": ["c"]})).unwrap_err();
        assert!(err.contains("missing its `labels`"));

        let err = instruction_from_value(json!({"args": ["x"]})).unwrap_err();
        assert!(err.contains("neither `op` nor `label`"));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(decode("[1, 2]"), Err(BrswapError::MalformedProgram { .. })));
        assert!(matches!(decode("{}"), Err(BrswapError::MalformedProgram { .. })));
        assert!(matches!(
            decode(r#"{"functions": [{"instrs": []}]}"#),
            Err(BrswapError::MalformedProgram { .. })
        ));
        assert!(matches!(decode("{not json"), Err(BrswapError::Decode(_))));
    }
}

//! IR Type Definitions
//!
//! Core data structures for Bril-style programs. Every record keeps the JSON
//! object it was decoded from, so fields the tool never inspects (source
//! positions, types, custom annotations) come back out verbatim and in their
//! original key order.

use serde_json::{Map, Value};

/// Raw JSON fields of a record
pub type Fields = Map<String, Value>;

/// Opcode of the two-way branch instruction
pub const BRANCH_OP: &str = "br";

/// Opcode used to materialize literals
pub const CONST_OP: &str = "const";

/// Opcode used to print values
pub const PRINT_OP: &str = "print";

/// Label marker: `{"label": "name"}`
#[derive(Debug, Clone, PartialEq)]
pub struct Label(pub(crate) Fields);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = Fields::new();
        fields.insert("label".to_string(), Value::String(name.into()));
        Label(fields)
    }
}

/// Branch: `{"op": "br", "args": [cond], "labels": [then, else]}`
#[derive(Debug, Clone, PartialEq)]
pub struct Branch(pub(crate) Fields);

impl Branch {
    pub fn new(cond: &str, labels: &[&str]) -> Self {
        let mut fields = Fields::new();
        fields.insert("args".to_string(), Value::from(vec![cond]));
        fields.insert("labels".to_string(), Value::from(labels.to_vec()));
        fields.insert("op".to_string(), Value::String(BRANCH_OP.to_string()));
        Branch(fields)
    }

    /// Target labels in their current order
    pub fn labels(&self) -> Vec<&str> {
        match self.0.get("labels") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Reverse the target list in place
    pub fn reverse_labels(&mut self) {
        if let Some(Value::Array(items)) = self.0.get_mut("labels") {
            items.reverse();
        }
    }
}

/// Any other operation: value-producing (`dest` set) or effect-only
#[derive(Debug, Clone, PartialEq)]
pub struct Operation(pub(crate) Fields);

impl Operation {
    /// `{"dest": dest, "op": "const", "type": ty, "value": value}`
    pub fn constant(dest: impl Into<String>, ty: &str, value: Value) -> Self {
        let mut fields = Fields::new();
        fields.insert("dest".to_string(), Value::String(dest.into()));
        fields.insert("op".to_string(), Value::String(CONST_OP.to_string()));
        fields.insert("type".to_string(), Value::String(ty.to_string()));
        fields.insert("value".to_string(), value);
        Operation(fields)
    }

    /// `{"args": args, "op": "print"}`
    pub fn print(args: Vec<String>) -> Self {
        let mut fields = Fields::new();
        fields.insert("args".to_string(), Value::from(args));
        fields.insert("op".to_string(), Value::String(PRINT_OP.to_string()));
        Operation(fields)
    }
}

/// IR instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Label(Label),
    Branch(Branch),
    Op(Operation),
}

impl Instruction {
    /// Get the result name if this instruction defines one
    ///
    /// Read from the raw record, so a `dest` on a label still counts.
    pub fn dest(&self) -> Option<&str> {
        self.fields().get("dest").and_then(Value::as_str)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Instruction::Branch(_))
    }

    /// The underlying JSON record
    pub fn fields(&self) -> &Fields {
        match self {
            Instruction::Label(Label(fields))
            | Instruction::Branch(Branch(fields))
            | Instruction::Op(Operation(fields)) => fields,
        }
    }
}

impl From<Label> for Instruction {
    fn from(label: Label) -> Self {
        Instruction::Label(label)
    }
}

impl From<Branch> for Instruction {
    fn from(branch: Branch) -> Self {
        Instruction::Branch(branch)
    }
}

impl From<Operation> for Instruction {
    fn from(op: Operation) -> Self {
        Instruction::Op(op)
    }
}

/// Bril function
///
/// `fields` holds everything except the instruction list; an `instrs` key is
/// kept as a placeholder so the list is written back in its original slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub instrs: Vec<Instruction>,
    pub(crate) fields: Fields,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("instrs".to_string(), Value::Null);
        Function {
            instrs: Vec::new(),
            fields,
        }
    }

    pub fn with_instrs(name: impl Into<String>, instrs: Vec<Instruction>) -> Self {
        let mut func = Function::new(name);
        func.instrs = instrs;
        func
    }

    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Names of the declared parameters (`"args": [{"name": ..}]`)
    pub fn params(&self) -> Vec<&str> {
        match self.fields.get("args") {
            Some(Value::Array(args)) => args
                .iter()
                .filter_map(|arg| arg.get("name").and_then(Value::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Result names defined in this function, in order
    pub fn dests(&self) -> impl Iterator<Item = &str> {
        self.instrs.iter().filter_map(Instruction::dest)
    }

    pub fn branch_count(&self) -> usize {
        self.instrs.iter().filter(|inst| inst.is_branch()).count()
    }
}

/// Complete Bril program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
    pub(crate) fields: Fields,
}

impl Program {
    pub fn new() -> Self {
        let mut fields = Fields::new();
        fields.insert("functions".to_string(), Value::Null);
        Program {
            functions: Vec::new(),
            fields,
        }
    }

    /// Every result name in the program, in document order
    pub fn dests(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().flat_map(|f| f.dests())
    }

    pub fn instruction_count(&self) -> usize {
        self.functions.iter().map(|f| f.instrs.len()).sum()
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Instruction> for Value {
    fn from(inst: Instruction) -> Self {
        match inst {
            Instruction::Label(Label(fields))
            | Instruction::Branch(Branch(fields))
            | Instruction::Op(Operation(fields)) => Value::Object(fields),
        }
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        let Function { instrs, mut fields } = func;
        // A function read without `instrs` is written back without one
        if fields.contains_key("instrs") || !instrs.is_empty() {
            let instrs = instrs.into_iter().map(Value::from).collect();
            fields.insert("instrs".to_string(), Value::Array(instrs));
        }
        Value::Object(fields)
    }
}

impl From<Program> for Value {
    fn from(program: Program) -> Self {
        let Program { functions, mut fields } = program;
        let functions = functions.into_iter().map(Value::from).collect();
        fields.insert("functions".to_string(), Value::Array(functions));
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constant_field_order() {
        let inst = Operation::constant("v0", "int", json!(7));
        let keys: Vec<&str> = inst.0.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["dest", "op", "type", "value"]);
        assert_eq!(inst.0["op"], json!("const"));
        assert_eq!(inst.0["value"], json!(7));
        assert_eq!(Instruction::from(inst).dest(), Some("v0"));
    }

    #[test]
    fn test_print_shape() {
        let inst = Operation::print(vec!["v3".to_string()]);
        assert_eq!(Value::from(Instruction::from(inst)), json!({"args": ["v3"], "op": "print"}));
    }

    #[test]
    fn test_branch_reverse() {
        let mut br = Branch::new("c", &["then", "else"]);
        br.reverse_labels();
        assert_eq!(br.labels(), vec!["else", "then"]);
        br.reverse_labels();
        assert_eq!(br.labels(), vec!["then", "else"]);
    }

    #[test]
    fn test_instruction_dest() {
        let inst = Instruction::from(Operation::constant("x", "int", json!(1)));
        assert_eq!(inst.dest(), Some("x"));

        let inst = Instruction::from(Label::new("entry"));
        assert_eq!(inst.dest(), None);
        assert!(!inst.is_branch());

        let mut label = Label::new("odd");
        label.0.insert("dest".to_string(), json!("v0"));
        assert_eq!(Instruction::from(label).dest(), Some("v0"));

        let inst = Instruction::from(Branch::new("c", &["a", "b"]));
        assert_eq!(inst.dest(), None);
        assert!(inst.is_branch());
    }

    #[test]
    fn test_function_params_and_dests() {
        let mut func = Function::with_instrs(
            "main",
            vec![
                Operation::constant("a", "int", json!(1)).into(),
                Label::new("l").into(),
                Operation::constant("b", "int", json!(2)).into(),
            ],
        );
        func.fields
            .insert("args".to_string(), json!([{"name": "n", "type": "int"}]));

        assert_eq!(func.name(), "main");
        assert_eq!(func.params(), vec!["n"]);
        assert_eq!(func.dests().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(func.branch_count(), 0);
    }

    #[test]
    fn test_function_to_value_keeps_slot() {
        let func = Function::with_instrs("f", vec![Label::new("x").into()]);
        let value = Value::from(func);
        let keys: Vec<&str> = value
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["name", "instrs"]);
        assert_eq!(value["instrs"], json!([{"label": "x"}]));
    }

    #[test]
    fn test_program_counts() {
        let mut program = Program::new();
        program.functions.push(Function::new("main"));
        program
            .functions
            .push(Function::with_instrs("helper", vec![Label::new("l").into()]));
        assert_eq!(program.instruction_count(), 1);
        assert_eq!(program.dests().count(), 0);
    }
}

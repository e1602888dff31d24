//! Symbol table: bounded, insertion-ordered variable bindings
//!
//! Lifecycle: created empty at the start of a run; entries added by
//! declarations (and assignments, which declare implicitly); entries removed
//! only by scope exit; the whole table is released once at program end, which
//! drops any out-of-band character storage.

use std::fmt;

/// Default capacity, matching the reference system's 32-entry table.
pub const DEFAULT_CAPACITY: usize = 32;

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Int,
    Float,
    Double,
    CharPtr,
    CharArray,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Int => write!(f, "int"),
            VarType::Float => write!(f, "float"),
            VarType::Double => write!(f, "double"),
            VarType::CharPtr => write!(f, "char*"),
            VarType::CharArray => write!(f, "char[]"),
        }
    }
}

/// A variable's current value.
///
/// `Chars` owns the out-of-band storage backing `char*`/`char[]` bindings.
/// Renderers never see the storage itself, only an opaque "addr" placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Chars { buffer: Vec<u8>, len: usize },
    #[default]
    Uninitialized,
}

impl Value {
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Value::Uninitialized)
    }

    /// Get the integer value, returns None if not an Int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// One declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub var_type: VarType,
    pub initialized: bool,
    pub value: Value,
    /// Element count for `char[]` declarations, 0 otherwise.
    pub array_len: usize,
}

impl Symbol {
    fn set(&mut self, var_type: VarType, value: Option<Value>, array_len: usize) {
        self.var_type = var_type;
        self.array_len = array_len;
        match value {
            Some(v) => {
                self.initialized = true;
                self.value = v;
            }
            None => {
                self.initialized = false;
                // Arrays get their backing storage at declaration even though
                // no element has been written yet.
                self.value = if var_type == VarType::CharArray {
                    Value::Chars {
                        buffer: vec![0; array_len],
                        len: array_len,
                    }
                } else {
                    Value::Uninitialized
                };
            }
        }
    }

    /// Render the bound value the way the trace displays it: the number for
    /// initialized scalars, `?` for uninitialized ones, and an opaque `addr`
    /// for character storage (arrays always render `addr`; pointers render
    /// `?` until assigned).
    pub fn render_value(&self) -> String {
        match self.var_type {
            VarType::Int => match (&self.value, self.initialized) {
                (Value::Int(n), true) => n.to_string(),
                _ => "?".to_string(),
            },
            VarType::Float | VarType::Double => match (&self.value, self.initialized) {
                (Value::Float(x), true) => x.to_string(),
                _ => "?".to_string(),
            },
            VarType::CharArray => "addr".to_string(),
            VarType::CharPtr => {
                if self.initialized {
                    "addr".to_string()
                } else {
                    "?".to_string()
                }
            }
        }
    }
}

/// Error returned when a declaration would exceed the table's capacity.
///
/// The caller's pending binding is dropped; the table is not mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFull {
    pub name: String,
    pub capacity: usize,
}

impl fmt::Display for TableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Symbol table is full ({} entries). Cannot add '{}'",
            self.capacity, self.name
        )
    }
}

impl std::error::Error for TableFull {}

/// Insertion-ordered collection of symbols with a hard capacity.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    items: Vec<Symbol>,
    capacity: usize,
    released: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            released: false,
        }
    }

    /// Look up a symbol by name. Linear scan; at most one match exists.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.items.iter().find(|s| s.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.items.iter_mut().find(|s| s.name == name)
    }

    /// Add a binding, or overwrite an existing one in place.
    ///
    /// Re-declaring a name updates its type, value, and initialized flag
    /// without changing the entry count. A genuinely new name is appended,
    /// failing with [`TableFull`] (and no mutation) at capacity. `value`
    /// absent means declared-but-uninitialized.
    pub fn add(
        &mut self,
        name: &str,
        var_type: VarType,
        value: Option<Value>,
        array_len: usize,
    ) -> Result<(), TableFull> {
        if let Some(existing) = self.find_mut(name) {
            existing.set(var_type, value, array_len);
            return Ok(());
        }

        if self.items.len() >= self.capacity {
            return Err(TableFull {
                name: name.to_string(),
                capacity: self.capacity,
            });
        }

        let mut symbol = Symbol {
            name: name.to_string(),
            var_type,
            initialized: false,
            value: Value::Uninitialized,
            array_len,
        };
        symbol.set(var_type, value, array_len);
        self.items.push(symbol);
        Ok(())
    }

    /// Remove the binding for `name`, preserving the relative order of the
    /// remaining entries. Returns whether a removal occurred.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.items.iter().position(|s| s.name == name) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop the out-of-band storage owned by `char*`/`char[]` bindings.
    ///
    /// Safe to call more than once: after the first call the table is marked
    /// released and later calls are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for symbol in &mut self.items {
            if matches!(symbol.var_type, VarType::CharPtr | VarType::CharArray) {
                symbol.value = Value::Uninitialized;
            }
        }
    }

    /// Entries in insertion order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_uninitialized() {
        let mut table = SymbolTable::new();
        table.add("x", VarType::Int, None, 0).unwrap();

        let symbol = table.find("x").unwrap();
        assert_eq!(symbol.var_type, VarType::Int);
        assert!(!symbol.initialized);
        assert_eq!(symbol.render_value(), "?");
    }

    #[test]
    fn test_add_with_value_is_initialized() {
        let mut table = SymbolTable::new();
        table.add("x", VarType::Int, Some(Value::Int(14)), 0).unwrap();

        let symbol = table.find("x").unwrap();
        assert!(symbol.initialized);
        assert_eq!(symbol.value, Value::Int(14));
    }

    #[test]
    fn test_redeclare_updates_in_place() {
        let mut table = SymbolTable::new();
        table.add("x", VarType::Float, None, 0).unwrap();
        table.add("x", VarType::Int, Some(Value::Int(3)), 0).unwrap();

        assert_eq!(table.len(), 1);
        let symbol = table.find("x").unwrap();
        assert_eq!(symbol.var_type, VarType::Int);
        assert_eq!(symbol.value, Value::Int(3));
    }

    #[test]
    fn test_capacity_rejects_without_mutation() {
        let mut table = SymbolTable::with_capacity(2);
        table.add("a", VarType::Int, None, 0).unwrap();
        table.add("b", VarType::Int, None, 0).unwrap();

        let err = table.add("c", VarType::Int, None, 0).unwrap_err();
        assert_eq!(err.name, "c");
        assert_eq!(err.capacity, 2);
        assert_eq!(table.len(), 2);
        assert!(table.find("c").is_none());

        // Updating an existing name still works at capacity.
        table.add("a", VarType::Int, Some(Value::Int(1)), 0).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table = SymbolTable::new();
        for name in ["a", "b", "c"] {
            table.add(name, VarType::Int, None, 0).unwrap();
        }

        assert!(table.remove("b"));
        assert!(!table.remove("b"));

        let names: Vec<&str> = table.symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn test_array_declaration_owns_storage() {
        let mut table = SymbolTable::new();
        table.add("buf", VarType::CharArray, None, 8).unwrap();

        let symbol = table.find("buf").unwrap();
        assert!(matches!(&symbol.value, Value::Chars { len: 8, .. }));
        assert_eq!(symbol.render_value(), "addr");
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut table = SymbolTable::new();
        table.add("buf", VarType::CharArray, None, 4).unwrap();
        table.add("x", VarType::Int, Some(Value::Int(7)), 0).unwrap();

        table.release();
        assert_eq!(table.find("buf").unwrap().value, Value::Uninitialized);
        assert_eq!(table.find("x").unwrap().value, Value::Int(7));

        // Second release must not disturb anything.
        table.release();
        assert_eq!(table.find("x").unwrap().value, Value::Int(7));
    }
}

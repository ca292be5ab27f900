//! Symbol model shared by all parsers and enhancement passes.
//!
//! Symbols are stored in a [`SymbolTable`] keyed by [`Address`]. Every
//! cross-reference between symbols (callers, callees, siblings) is an
//! `Address` key into that table rather than a pointer to another record.

use crate::utils::config::ADDRESS_WIDTH;
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Address of a symbol, the identity key of the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(u64);

impl Address {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| ParseError::InvalidHex(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.0, width = ADDRESS_WIDTH)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    #[default]
    Function,
    Variable,
}

impl SymbolType {
    /// Map an `nm` type letter to a symbol type
    ///
    /// Only text symbols (`t`/`T`) are functions, everything else is data.
    pub fn from_nm_code(code: char) -> Self {
        match code {
            't' | 'T' => Self::Function,
            _ => Self::Variable,
        }
    }
}

/// One function or variable of the analyzed program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub address: Address,

    pub name: String,

    /// Name as printed elsewhere (e.g. with a compiler suffix), when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,

    #[serde(rename = "type")]
    pub symbol_type: SymbolType,

    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Normalized source path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Raw disassembly lines, only for symbols seen in a listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_qualifiers: Option<String>,

    /// `None` until the call graph has been built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callers: Option<BTreeSet<Address>>,

    /// `None` until the call graph has been built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callees: Option<BTreeSet<Address>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_function: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_function: Option<Address>,

    /// Key of the owning source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Symbol {
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            raw_name: None,
            symbol_type: SymbolType::Function,
            size: None,
            path: None,
            base_file: None,
            line: None,
            instructions: None,
            stack_size: None,
            stack_qualifiers: None,
            callers: None,
            callees: None,
            prev_function: None,
            next_function: None,
            file: None,
        }
    }

    pub fn with_type(mut self, symbol_type: SymbolType) -> Self {
        self.symbol_type = symbol_type;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Attach a source location; the path is normalized here
    pub fn with_location(mut self, path: &str, line: u32) -> Self {
        self.set_path(path);
        self.line = Some(line);
        self
    }

    pub fn with_instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn set_path(&mut self, path: &str) {
        let normalized = crate::utils::path::normalize_path(path);
        self.base_file = Some(crate::utils::path::base_file(&normalized).to_string());
        self.path = Some(normalized);
    }

    pub fn is_function(&self) -> bool {
        self.symbol_type == SymbolType::Function
    }

    /// Merge the fields present in `other` into this record
    ///
    /// Fields absent from `other` never erase what is already known. The
    /// first name and the type of the existing record are kept; a differing
    /// later name is remembered in `raw_name`.
    pub fn merge(&mut self, other: Symbol) {
        debug_assert_eq!(self.address, other.address);
        let mut alternate = other.raw_name;
        if self.name.is_empty() {
            self.name = other.name;
        } else if !other.name.is_empty() && self.name != other.name {
            debug!(
                "Symbol at {} also named {}, keeping {}",
                self.address, other.name, self.name
            );
            alternate = alternate.or(Some(other.name));
        }
        if self.raw_name.is_none() {
            self.raw_name = alternate;
        }
        merge_field(&mut self.size, other.size);
        merge_field(&mut self.path, other.path);
        merge_field(&mut self.base_file, other.base_file);
        merge_field(&mut self.line, other.line);
        merge_field(&mut self.instructions, other.instructions);
        merge_field(&mut self.stack_size, other.stack_size);
        merge_field(&mut self.stack_qualifiers, other.stack_qualifiers);
        merge_field(&mut self.callers, other.callers);
        merge_field(&mut self.callees, other.callees);
        merge_field(&mut self.prev_function, other.prev_function);
        merge_field(&mut self.next_function, other.next_function);
        merge_field(&mut self.file, other.file);
    }
}

fn merge_field<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// Address-ordered table of all symbols
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<Address, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, merging into the existing record at the same address
    pub fn upsert(&mut self, symbol: Symbol) -> &mut Symbol {
        match self.symbols.entry(symbol.address) {
            btree_map::Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.merge(symbol);
                existing
            }
            btree_map::Entry::Vacant(entry) => entry.insert(symbol),
        }
    }

    pub fn get(&self, address: &Address) -> Option<&Symbol> {
        self.symbols.get(address)
    }

    pub fn get_mut(&mut self, address: &Address) -> Option<&mut Symbol> {
        self.symbols.get_mut(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.symbols.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.symbols.values_mut()
    }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.symbols.keys().copied()
    }

    /// Function symbols in ascending address order
    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(|s| s.is_function())
    }
}

impl FromIterator<Symbol> for SymbolTable {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        let mut table = Self::new();
        for symbol in iter {
            table.upsert(symbol);
        }
        table
    }
}

//! Parser for GCC `-fstack-usage` reports (`.su` files).
//!
//! ```text
//! puncover.c:14:40:0	16	dynamic,bounded
//! ```
//!
//! The function-name column is unreliable (GCC may print `0`, a mangled name
//! or a clone name), so records are matched to symbols by file and line.

use super::schema::{Address, SymbolTable};
use crate::utils::error::ParseError;
use crate::utils::path::base_file;
use once_cell::sync::Lazy;
use regex::Regex;

static STACK_USAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>[^:\t]+):(?P<line>\d+):(?P<column>\d+):(?P<function>[^\t]*)\t(?P<size>\d+)\t(?P<qualifiers>[^\t]*?)\s*$",
    )
    .expect("stack usage pattern is valid")
});

/// One parsed `.su` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackUsage {
    pub base_file: String,
    pub line: u32,
    pub column: u32,
    pub function: String,
    pub stack_size: u64,
    pub qualifiers: String,
}

/// Parse a single `.su` line without looking at any symbol
///
/// # Errors
/// * `ParseError::MalformedStackUsageLine` - line does not have the expected columns
pub fn parse_stack_usage_record(line: &str) -> Result<StackUsage, ParseError> {
    let malformed = || ParseError::MalformedStackUsageLine(line.to_string());
    let caps = STACK_USAGE_LINE.captures(line).ok_or_else(malformed)?;

    Ok(StackUsage {
        base_file: base_file(&caps["file"]).to_string(),
        line: caps["line"].parse().map_err(|_| malformed())?,
        column: caps["column"].parse().map_err(|_| malformed())?,
        function: caps["function"].to_string(),
        stack_size: caps["size"].parse().map_err(|_| malformed())?,
        qualifiers: caps["qualifiers"].to_string(),
    })
}

/// Find the symbol defined at `base_file:line`
///
/// Functions win over variables; among equals the lowest address is used.
pub fn find_symbol_at(table: &SymbolTable, base_file: &str, line: u32) -> Option<Address> {
    let mut candidates = table
        .iter()
        .filter(|s| s.line == Some(line) && s.base_file.as_deref() == Some(base_file));
    let first = candidates.next()?;
    if first.is_function() {
        return Some(first.address);
    }
    candidates
        .find(|s| s.is_function())
        .map(|s| s.address)
        .or(Some(first.address))
}

/// Parse a `.su` line and attach the stack metrics to the matching symbol
///
/// **Public** - used by the collector for every stack usage line
///
/// # Errors
/// * `ParseError::MalformedStackUsageLine` - unparseable line
/// * `ParseError::NoMatchingSymbol` - no symbol at that file and line
///
/// The table is left unchanged on error.
pub fn parse_stack_usage_line(table: &mut SymbolTable, line: &str) -> Result<Address, ParseError> {
    let usage = parse_stack_usage_record(line)?;
    let address = find_symbol_at(table, &usage.base_file, usage.line).ok_or_else(|| {
        ParseError::NoMatchingSymbol {
            file: usage.base_file.clone(),
            line: usage.line,
        }
    })?;

    if let Some(symbol) = table.get_mut(&address) {
        symbol.stack_size = Some(usage.stack_size);
        symbol.stack_qualifiers = Some(usage.qualifiers);
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{Symbol, SymbolType};

    #[test]
    fn test_record_fields() {
        let usage = parse_stack_usage_record("src/puncover.c:8:43:dynamic_stack2\t16\tdynamic").unwrap();
        assert_eq!(usage.base_file, "puncover.c");
        assert_eq!(usage.line, 8);
        assert_eq!(usage.column, 43);
        assert_eq!(usage.function, "dynamic_stack2");
        assert_eq!(usage.stack_size, 16);
        assert_eq!(usage.qualifiers, "dynamic");
    }

    #[test]
    fn test_function_preferred_over_variable() {
        let table: SymbolTable = [
            Symbol::new(Address::new(0x10), "v")
                .with_type(SymbolType::Variable)
                .with_location("a.c", 3),
            Symbol::new(Address::new(0x20), "f").with_location("a.c", 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(find_symbol_at(&table, "a.c", 3), Some(Address::new(0x20)));
    }

    #[test]
    fn test_malformed_line() {
        assert!(matches!(
            parse_stack_usage_record("puncover.c:14\t16"),
            Err(ParseError::MalformedStackUsageLine(_))
        ));
    }
}

//! Parser for `nm --print-size --line-numbers` output.
//!
//! Only lines that carry a source location are accepted:
//!
//! ```text
//! 00000550 00000034 T main\t/path/to/src/puncover.c:25
//! ```

use super::schema::{Address, Symbol, SymbolTable, SymbolType};
use crate::utils::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

static SIZE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<addr>[0-9a-fA-F]+)\s+(?P<size>[0-9a-fA-F]+)\s+(?P<type>[a-zA-Z])\s+(?P<name>[^\t]+?)\s*\t(?P<path>.+):(?P<line>\d+)\s*$",
    )
    .expect("size line pattern is valid")
});

/// Parse one size table line into a standalone symbol record
///
/// **Public** - pure parsing, does not touch any table
///
/// # Errors
/// * `ParseError::MalformedSizeLine` - a field or the `PATH:LINE` suffix is missing
pub fn parse_size_record(line: &str) -> Result<Symbol, ParseError> {
    let caps = SIZE_LINE
        .captures(line)
        .ok_or_else(|| ParseError::MalformedSizeLine(line.to_string()))?;

    let address: Address = caps["addr"].parse()?;
    let size = u64::from_str_radix(&caps["size"], 16)
        .map_err(|_| ParseError::InvalidHex(caps["size"].to_string()))?;
    let type_code = caps["type"].chars().next().unwrap_or('?');
    let line_number: u32 = caps["line"]
        .parse()
        .map_err(|_| ParseError::MalformedSizeLine(line.to_string()))?;

    Ok(Symbol::new(address, caps["name"].trim())
        .with_type(SymbolType::from_nm_code(type_code))
        .with_size(size)
        .with_location(&caps["path"], line_number))
}

/// Parse one size table line and merge it into `table`
///
/// **Public** - used by the collector for every `nm` line
///
/// # Returns
/// Address of the created or updated symbol. On error the table is unchanged.
pub fn parse_size_line(table: &mut SymbolTable, line: &str) -> Result<Address, ParseError> {
    let symbol = parse_size_record(line)?;
    let symbol_type = symbol.symbol_type;
    // nm is the only source that knows the symbol type
    let record = table.upsert(symbol);
    record.symbol_type = symbol_type;
    Ok(record.address)
}

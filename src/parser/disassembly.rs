//! Parser for `objdump --disassemble --line-numbers` listings.
//!
//! A listing is a sequence of symbol blocks:
//!
//! ```text
//! 00000098 <pbl_table_addr.constprop.0>:
//! /path/to/src/pbl.c:8
//! pbl_table_addr():
//!   98:	a8a8a8a8 	.word	0xa8a8a8a8
//! ```
//!
//! Every line after a header belongs to that symbol until the next header.
//! Source references (`PATH:LINE`) and blank lines are dropped, all other
//! lines are kept verbatim as the symbol's instructions.

use super::schema::{Address, Symbol, SymbolTable, SymbolType};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static SYMBOL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<addr>[0-9a-fA-F]+)\s+<(?P<name>[^>]+)>:\s*$")
        .expect("symbol header pattern is valid")
});

static SOURCE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:[^\s:]*[/\\.][^\s:]*|[A-Za-z]:[^\s:]+):\d+(?:\s+\(discriminator \d+\))?\s*$",
    )
    .expect("source reference pattern is valid")
});

const SECTION_BANNER: &str = "Disassembly of section ";

/// Symbol block being accumulated
struct PendingSymbol {
    address: Address,
    header_name: String,
    lines: Vec<String>,
}

impl PendingSymbol {
    fn into_symbol(self) -> Symbol {
        let name = strip_compiler_suffix(&self.header_name);
        let raw_name = (name != self.header_name).then(|| self.header_name.clone());
        let mut symbol = Symbol::new(self.address, name)
            .with_type(SymbolType::Function)
            .with_instructions(self.lines);
        symbol.raw_name = raw_name;
        symbol
    }
}

/// Remove GCC clone suffixes such as `.constprop.0`, `.isra.1`, `.part.2` or `.cold`
///
/// Names that start with a dot (section-like labels) are returned unchanged.
pub fn strip_compiler_suffix(name: &str) -> &str {
    match name.find('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Whether a listing line is an interleaved `PATH:LINE` source reference
pub fn is_source_reference(line: &str) -> bool {
    SOURCE_REFERENCE.is_match(line)
}

/// Remove the leading whitespace shared by all non-blank lines
///
/// Used to display an instruction block without objdump's indentation.
pub fn left_strip_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let indent = lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            let l = l.as_ref();
            l.get(indent..).unwrap_or_else(|| l.trim_start()).to_string()
        })
        .collect()
}

/// Parse a whole disassembly listing into `table`
///
/// **Public** - used by the collector
///
/// # Returns
/// Number of symbol headers found
pub fn parse_assembly_text(table: &mut SymbolTable, assembly: &str) -> usize {
    let mut found = 0;
    let mut current: Option<PendingSymbol> = None;

    for line in assembly.lines() {
        if let Some(caps) = SYMBOL_HEADER.captures(line) {
            if let Some(done) = current.take() {
                table.upsert(done.into_symbol());
            }
            // lines of a block with an unusable address belong to no symbol
            let Ok(address) = caps["addr"].parse::<Address>() else {
                debug!("Skipping disassembly block with bad address: {}", line);
                continue;
            };
            found += 1;
            current = Some(PendingSymbol {
                address,
                header_name: caps["name"].to_string(),
                lines: Vec::new(),
            });
            continue;
        }

        let Some(pending) = current.as_mut() else {
            continue;
        };
        if line.trim().is_empty() || line.starts_with(SECTION_BANNER) || is_source_reference(line) {
            continue;
        }
        pending.lines.push(line.to_string());
    }

    if let Some(done) = current.take() {
        table.upsert(done.into_symbol());
    }

    debug!("Parsed {} symbols from disassembly", found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_compiler_suffix() {
        assert_eq!(strip_compiler_suffix("pbl_table_addr.constprop.0"), "pbl_table_addr");
        assert_eq!(strip_compiler_suffix("foo.part.1"), "foo");
        assert_eq!(strip_compiler_suffix("__aeabi_dmul"), "__aeabi_dmul");
        assert_eq!(strip_compiler_suffix(".text"), ".text");
    }

    #[test]
    fn test_source_reference_detection() {
        assert!(is_source_reference("/path/to.c:8"));
        assert!(is_source_reference("../src/main.c:120 (discriminator 2)"));
        assert!(is_source_reference("C:\\work\\main.c:7"));
        assert!(!is_source_reference(" 568:\tf7ff ffca \tbl\t98"));
        assert!(!is_source_reference("pbl_table_addr():"));
        assert!(!is_source_reference("foo.constprop.0():"));
    }

    #[test]
    fn test_section_banner_is_not_an_instruction() {
        let mut table = SymbolTable::new();
        let listing = "00000010 <a>:\n  10:\t4770      \tbx\tlr\n\nDisassembly of section .text.b:\n\n00000020 <b>:\n  20:\t4770      \tbx\tlr\n";
        assert_eq!(parse_assembly_text(&mut table, listing), 2);
        let a = table.get(&Address::new(0x10)).unwrap();
        assert_eq!(a.instructions.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_block_with_oversized_address_is_dropped() {
        let mut table = SymbolTable::new();
        let listing = "00000010 <a>:\n  10:\t4770      \tbx\tlr\n\n11111111111111111111 <huge>:\n  20:\tf7ff fff5 \tbl\t10\n  24:\t4770      \tbx\tlr\n";

        assert_eq!(parse_assembly_text(&mut table, listing), 1);
        assert_eq!(table.len(), 1);
        let a = table.get(&Address::new(0x10)).unwrap();
        assert_eq!(a.instructions.as_ref().unwrap().len(), 1);
    }
}

//! Address-order neighbors of functions and size inference.

use crate::parser::schema::{Address, SymbolTable};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[0-9a-fA-F]+:\s+(?P<rest>.*)$").expect("code line pattern is valid")
});

/// Number of encoded bytes on one disassembly line
///
/// Counts the hex opcode tokens between `ADDR:` and the mnemonic. Each token
/// contributes half its digit count, so a Thumb halfword (`4668`) is 2 bytes,
/// a 32-bit word (`000001ba` or `ebad 0d03`) is 4. Label lines such as
/// `name():` have no code and count 0.
pub fn count_code_bytes(line: &str) -> u64 {
    let Some(caps) = CODE_LINE.captures(line) else {
        return 0;
    };
    let rest = &caps["rest"];
    // opcode column ends at the mnemonic tab, or at the ASCII dump of raw data
    let column = rest.split('\t').next().unwrap_or("");
    let column = column.split("  ").next().unwrap_or("");

    column
        .split_whitespace()
        .take_while(|token| token.chars().all(|c| c.is_ascii_hexdigit()))
        .map(|token| (token.len() / 2) as u64)
        .sum()
}

/// Link every function to its address-order predecessor and successor
///
/// **Public** - enhancement pass run by the collector
///
/// The first function has no `prev_function`, the last has no
/// `next_function`. Non-function symbols never carry sibling links.
pub fn link_siblings(table: &mut SymbolTable) {
    let functions: Vec<Address> = table.functions().map(|s| s.address).collect();

    for symbol in table.iter_mut() {
        symbol.prev_function = None;
        symbol.next_function = None;
    }

    for (index, address) in functions.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| functions[i]);
        let next = functions.get(index + 1).copied();
        if let Some(symbol) = table.get_mut(address) {
            symbol.prev_function = prev;
            symbol.next_function = next;
        }
    }

    debug!("Linked {} functions by address", functions.len());
}

/// Fill in `size` from the instruction bytes for symbols that have none
///
/// **Public** - enhancement pass run by the collector
///
/// # Returns
/// Number of symbols whose size was inferred
pub fn infer_function_sizes(table: &mut SymbolTable) -> usize {
    let mut inferred = 0;
    for symbol in table.iter_mut() {
        if symbol.size.is_some() {
            continue;
        }
        let Some(lines) = &symbol.instructions else {
            continue;
        };
        symbol.size = Some(lines.iter().map(|l| count_code_bytes(l)).sum());
        inferred += 1;
    }
    inferred
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x86_byte_tokens() {
        assert_eq!(count_code_bytes("  401136:\te8 eb ff ff ff       \tcall   401126 <foo>"), 5);
    }

    #[test]
    fn test_raw_data_stops_at_ascii_dump() {
        assert_eq!(
            count_code_bytes(" 805bbac:\t2471 0805 b64b 0804 b3c9 0804 b459 0804     q$..K.......Y..."),
            16
        );
    }

    #[test]
    fn test_label_lines_have_no_bytes() {
        assert_eq!(count_code_bytes("$t():"), 0);
        assert_eq!(count_code_bytes("face():"), 0);
    }
}

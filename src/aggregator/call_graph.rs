//! Call graph reconstruction from disassembly text.
//!
//! Branch and call instructions that target the start address of a known
//! symbol become caller/callee edges. Targets that do not resolve (library
//! code without debug info, branches into the middle of a function) are
//! skipped.

use crate::parser::schema::{Address, SymbolTable};
use crate::utils::config::BRANCH_CONDITIONS;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// LABEL: OPCODE_TOKENS <tab> MNEMONIC TARGET [<label>]
static BRANCH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*[0-9a-fA-F]+:\s*(?:[0-9a-fA-F]{2,8}\s)+\s*\t\s*(?P<mnemonic>[a-zA-Z][a-zA-Z0-9.]*)\s+(?P<target>[0-9a-fA-F]+)(?P<label>\s+<[^>]*>)?\s*$",
    )
    .expect("branch line pattern is valid")
});

/// A branch or call found in an instruction line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTarget {
    pub mnemonic: String,
    pub target: Address,
    /// Whether objdump already annotated the target with `<label>`
    pub labeled: bool,
}

/// Whether `mnemonic` is a branch/call: `b`, `bl`, `blx` with an optional
/// ARM condition code and `.n`/`.w` width suffix, or an x86 `call`.
pub fn is_branch_mnemonic(mnemonic: &str) -> bool {
    let mnemonic = mnemonic.to_ascii_lowercase();
    if matches!(mnemonic.as_str(), "call" | "callq" | "calll") {
        return true;
    }

    let base = mnemonic
        .strip_suffix(".n")
        .or_else(|| mnemonic.strip_suffix(".w"))
        .unwrap_or(mnemonic.as_str());

    ["blx", "bl", "b"].iter().any(|prefix| {
        base.strip_prefix(prefix)
            .is_some_and(|cond| cond.is_empty() || BRANCH_CONDITIONS.contains(&cond))
    })
}

/// Extract the branch target of a single instruction line, if it has one
pub fn branch_target(line: &str) -> Option<BranchTarget> {
    let caps = BRANCH_LINE.captures(line)?;
    let mnemonic = &caps["mnemonic"];
    if !is_branch_mnemonic(mnemonic) {
        return None;
    }
    Some(BranchTarget {
        mnemonic: mnemonic.to_string(),
        target: caps["target"].parse().ok()?,
        labeled: caps.name("label").is_some(),
    })
}

/// Resolved call edges `(caller, callee)` found in the instruction text of `table`
pub fn collect_call_edges(table: &SymbolTable) -> BTreeSet<(Address, Address)> {
    let mut edges = BTreeSet::new();
    let mut unresolved = 0usize;

    for symbol in table.iter() {
        let Some(lines) = &symbol.instructions else {
            continue;
        };
        for branch in lines.iter().filter_map(|line| branch_target(line)) {
            if table.contains(&branch.target) {
                edges.insert((symbol.address, branch.target));
            } else {
                unresolved += 1;
            }
        }
    }

    debug!(
        "Found {} call edges, {} unresolved branch targets",
        edges.len(),
        unresolved
    );
    edges
}

/// Populate `callers`/`callees` for every symbol that has instructions
///
/// **Public** - enhancement pass run by the collector
///
/// Symbols with instructions, and every symbol reached by an edge, end up
/// with `Some` lists even if they are empty. Running the pass again on the
/// same table yields the same result.
///
/// # Returns
/// Number of distinct call edges
pub fn build_call_graph(table: &mut SymbolTable) -> usize {
    let edges = collect_call_edges(table);

    for symbol in table.iter_mut() {
        if symbol.instructions.is_some() {
            symbol.callers.get_or_insert_with(BTreeSet::new);
            symbol.callees.get_or_insert_with(BTreeSet::new);
        }
    }

    for (caller, callee) in &edges {
        if let Some(symbol) = table.get_mut(caller) {
            symbol.callers.get_or_insert_with(BTreeSet::new);
            symbol.callees.get_or_insert_with(BTreeSet::new).insert(*callee);
        }
        if let Some(symbol) = table.get_mut(callee) {
            symbol.callees.get_or_insert_with(BTreeSet::new);
            symbol.callers.get_or_insert_with(BTreeSet::new).insert(*caller);
        }
    }

    edges.len()
}

/// Append ` <name>` to branch lines whose resolved target objdump left unlabeled
///
/// **Public** - enhancement pass run by the collector
///
/// # Returns
/// Number of rewritten lines
pub fn annotate_branch_targets(table: &mut SymbolTable) -> usize {
    let mut rewrites: Vec<(Address, usize, String)> = Vec::new();

    for symbol in table.iter() {
        let Some(lines) = &symbol.instructions else {
            continue;
        };
        for (index, line) in lines.iter().enumerate() {
            let Some(branch) = branch_target(line) else {
                continue;
            };
            if branch.labeled {
                continue;
            }
            if let Some(target) = table.get(&branch.target) {
                rewrites.push((
                    symbol.address,
                    index,
                    format!("{} <{}>", line.trim_end(), target.name),
                ));
            }
        }
    }

    let count = rewrites.len();
    for (address, index, line) in rewrites {
        if let Some(slot) = table
            .get_mut(&address)
            .and_then(|s| s.instructions.as_mut())
            .and_then(|lines| lines.get_mut(index))
        {
            *slot = line;
        }
    }
    count
}

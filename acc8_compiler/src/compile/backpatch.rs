//! Placeholder cells and the tables used to resolve them.
//!
//! Code is emitted before variable storage and forward jump distances
//! are known. Those bytes are emitted as placeholders and substituted
//! once code generation is done.
use super::CompileError;
use crate::semantic::{ScopeId, SymbolId};
use smol_str::SmolStr;
use std::{convert::TryFrom, fmt};

/// Index of an entry in the [`VariableTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// Index of an entry in the [`JumpTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JumpId(usize);

/// One byte of emitted code, possibly not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Byte(u8),
    /// Low byte of a variable's storage address.
    Var(VarId),
    /// High byte of a variable's storage address, always zero.
    VarHigh(VarId),
    /// Distance of a branch.
    Jump(JumpId),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Byte(byte) => write!(f, "{:02X}", byte),
            Cell::Var(id) => write!(f, "T{}", id.0),
            Cell::VarHigh(_) => write!(f, "XX"),
            Cell::Jump(id) => write!(f, "J{}", id.0),
        }
    }
}

/// Render a cell stream, 8 cells per row.
pub fn render_cells(cells: &[Cell]) -> String {
    cells
        .chunks(8)
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOwner {
    /// Storage of a declared variable.
    Symbol { symbol: SymbolId, name: char, scope: ScopeId },
    /// Scratch cell for intermediate values, by nesting depth.
    Scratch(usize),
}

#[derive(Debug, Clone)]
pub struct VariableEntry {
    /// Textual form of the placeholder, `T<n>XX`.
    pub placeholder: SmolStr,
    pub owner: VarOwner,
    /// Position of the storage byte after the end of the code.
    pub offset: usize,
}

#[derive(Debug, Default, Clone)]
pub struct VariableTable {
    entries: Vec<VariableEntry>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, owner: VarOwner) -> VarId {
        let offset = self.entries.len();
        self.entries.push(VariableEntry {
            placeholder: SmolStr::from(format!("T{}XX", offset)),
            owner,
            offset,
        });
        VarId(offset)
    }

    #[inline]
    pub fn get(&self, id: VarId) -> Option<&VariableEntry> {
        self.entries.get(id.0)
    }

    /// Storage of a declared symbol.
    pub fn find_symbol(&self, symbol: SymbolId) -> Option<VarId> {
        self.entries
            .iter()
            .position(|entry| matches!(entry.owner, VarOwner::Symbol { symbol: s, .. } if s == symbol))
            .map(VarId)
    }

    /// Final address of a variable, given the length of the code.
    pub fn address(&self, id: VarId, code_len: usize) -> Result<u8, CompileError> {
        let entry = self
            .get(id)
            .ok_or(CompileError::MalformedTree("variable placeholder without entry"))?;
        u8::try_from(code_len + entry.offset).map_err(|_| CompileError::ImageOverflow {
            code: code_len,
            variables: self.len(),
            heap_start: acc8_core::IMAGE_SIZE,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for VariableTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const RULE: &str = "+------+-----+-------+--------+";

        writeln!(f, "{}", RULE)?;
        writeln!(f, "| Temp | Var | Scope | Offset |")?;
        writeln!(f, "{}", RULE)?;
        for entry in &self.entries {
            let (name, scope) = match entry.owner {
                VarOwner::Symbol { name, scope, .. } => (name.to_string(), scope.to_string()),
                VarOwner::Scratch(_) => ("~".to_string(), "-".to_string()),
            };
            writeln!(f, "| {:<4} | {:<3} | {:<5} | {:<6} |", entry.placeholder, name, scope, entry.offset)?;
        }
        writeln!(f, "{}", RULE)
    }
}

#[derive(Debug, Clone)]
pub struct JumpEntry {
    /// Textual form of the placeholder, `J<n>`.
    pub placeholder: SmolStr,
    /// Bytes to branch over, wrapping for backward branches.
    ///
    /// Unknown until the guarded block has been emitted.
    pub distance: Option<u8>,
}

#[derive(Debug, Default, Clone)]
pub struct JumpTable {
    entries: Vec<JumpEntry>,
}

impl JumpTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self) -> JumpId {
        let index = self.entries.len();
        self.entries.push(JumpEntry {
            placeholder: SmolStr::from(format!("J{}", index)),
            distance: None,
        });
        JumpId(index)
    }

    pub fn set_distance(&mut self, id: JumpId, distance: u8) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.distance = Some(distance);
        }
    }

    #[inline]
    pub fn get(&self, id: JumpId) -> Option<&JumpEntry> {
        self.entries.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JumpEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for JumpTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const RULE: &str = "+------+----------+";

        writeln!(f, "{}", RULE)?;
        writeln!(f, "| Jump | Distance |")?;
        writeln!(f, "{}", RULE)?;
        for entry in &self.entries {
            let distance = entry.distance.map(|d| format!("{:02X}", d)).unwrap_or_else(|| "??".to_string());
            writeln!(f, "| {:<4} | {:<8} |", entry.placeholder, distance)?;
        }
        writeln!(f, "{}", RULE)
    }
}

/// Replace every variable placeholder with the variable's storage address.
///
/// Storage is assigned in declaration order, starting at the first
/// byte after the code.
pub fn patch_addresses(cells: &mut [Cell], variables: &VariableTable) -> Result<(), CompileError> {
    let code_len = cells.len();
    for cell in cells.iter_mut() {
        match *cell {
            Cell::Var(id) => *cell = Cell::Byte(variables.address(id, code_len)?),
            Cell::VarHigh(_) => *cell = Cell::Byte(0x00),
            _ => {}
        }
    }
    Ok(())
}

/// Replace every jump placeholder with its recorded distance.
pub fn patch_jumps(cells: &mut [Cell], jumps: &JumpTable) -> Result<(), CompileError> {
    for cell in cells.iter_mut() {
        if let Cell::Jump(id) = *cell {
            let entry = jumps
                .get(id)
                .ok_or(CompileError::MalformedTree("jump placeholder without entry"))?;
            let distance = entry
                .distance
                .ok_or_else(|| CompileError::UnresolvedJump(entry.placeholder.clone()))?;
            *cell = Cell::Byte(distance);
        }
    }
    Ok(())
}

/// Final bytes of a fully patched cell stream.
pub fn into_bytes(cells: &[Cell]) -> Result<Vec<u8>, CompileError> {
    cells
        .iter()
        .map(|cell| match cell {
            Cell::Byte(byte) => Ok(*byte),
            Cell::Jump(_) => Err(CompileError::UnresolvedJump(SmolStr::from(cell.to_string()))),
            Cell::Var(_) | Cell::VarHigh(_) => Err(CompileError::MalformedTree("unpatched variable placeholder")),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_patch_passes() {
        let mut variables = VariableTable::new();
        let mut jumps = JumpTable::new();
        let a = variables.add(VarOwner::Scratch(0));
        let b = variables.add(VarOwner::Scratch(1));
        let jump = jumps.add();
        jumps.set_distance(jump, 0x03);

        let mut cells = vec![
            Cell::Byte(0x8D),
            Cell::Var(b),
            Cell::VarHigh(b),
            Cell::Byte(0xD0),
            Cell::Jump(jump),
            Cell::Byte(0xAD),
            Cell::Var(a),
            Cell::VarHigh(a),
        ];
        assert_eq!(render_cells(&cells), "8D T1 XX D0 J0 AD T0 XX");

        patch_addresses(&mut cells, &variables).unwrap();
        patch_jumps(&mut cells, &jumps).unwrap();
        let bytes = into_bytes(&cells).unwrap();

        assert_eq!(bytes, vec![0x8D, 0x09, 0x00, 0xD0, 0x03, 0xAD, 0x08, 0x00]);
    }

    #[test]
    fn test_unresolved_jump() {
        let mut jumps = JumpTable::new();
        let jump = jumps.add();
        let mut cells = vec![Cell::Byte(0xD0), Cell::Jump(jump)];

        let err = patch_jumps(&mut cells, &jumps).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedJump(ref p) if p == "J0"));
    }
}

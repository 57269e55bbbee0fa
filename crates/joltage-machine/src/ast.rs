use crate::lexer::Span;

/// A parsed machine file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub machines: Vec<Machine>,
}

/// One machine: `[.##.] (3) (1,3) (2) {3,5,4,7}`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub span: Span,
    /// Target indicator pattern, `true` for `#`
    pub lights: Vec<bool>,
    /// Counter/light indices each button is wired to
    pub buttons: Vec<Button>,
    /// Target value per joltage counter
    pub joltage: Vec<u64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub span: Span,
    pub wiring: Vec<usize>,
}

impl Button {
    pub fn affects(&self, index: usize) -> bool {
        self.wiring.contains(&index)
    }
}

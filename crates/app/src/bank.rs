use std::fmt;
use std::path::Path;

use quiz_core::model::Question;

const BUILT_IN_BANK: &str = include_str!("../data/questions.json");

#[derive(Debug)]
pub enum BankError {
    Io { path: String, source: std::io::Error },
    Parse(serde_json::Error),
    Empty,
}

impl fmt::Display for BankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankError::Io { path, source } => write!(f, "cannot read question bank {path}: {source}"),
            BankError::Parse(err) => write!(f, "invalid question bank: {err}"),
            BankError::Empty => write!(f, "question bank has no questions"),
        }
    }
}

impl std::error::Error for BankError {}

/// Questions shipped with the binary.
pub fn built_in() -> Result<Vec<Question>, BankError> {
    parse(BUILT_IN_BANK)
}

/// Questions from a JSON file in the bank format.
pub fn from_file(path: &Path) -> Result<Vec<Question>, BankError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&raw)
}

fn parse(raw: &str) -> Result<Vec<Question>, BankError> {
    let questions: Vec<Question> = serde_json::from_str(raw).map_err(BankError::Parse)?;
    if questions.is_empty() {
        return Err(BankError::Empty);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn built_in_bank_is_valid() {
        let bank = built_in().unwrap();
        assert_eq!(bank.len(), 20);
        let ids: HashSet<_> = bank.iter().map(Question::id).collect();
        assert_eq!(ids.len(), bank.len());
    }

    #[test]
    fn empty_bank_is_rejected() {
        assert!(matches!(parse("[]"), Err(BankError::Empty)));
    }
}

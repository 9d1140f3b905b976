use crate::TermId;
use std::collections::HashMap;

/// Assigns a TermId the first time a term is seen during block construction.
/// One table is threaded through every chunk so ids stay stable across blocks.
#[derive(Debug, Default)]
pub struct TermIdTable {
    ids: HashMap<String, TermId>,
    terms: Vec<String>,
    next_id: TermId,
}

impl TermIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(term.to_string(), id);
        self.terms.push(term.to_string());
        id
    }

    pub fn get(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_and_sequential() {
        let mut t = TermIdTable::new();
        assert_eq!(t.intern("dog"), 0);
        assert_eq!(t.intern("cat"), 1);
        assert_eq!(t.intern("dog"), 0);
        assert_eq!(t.term(1), Some("cat"));
        assert_eq!(t.get("fish"), None);
        assert_eq!(t.len(), 2);
    }
}

use rusqlite::types::ToSql;

const NAME_LIKE: &str = "lower(name) LIKE";

/// Conjunctive substring filter over show names: one `(predicate, parameter)`
/// pair per token, applied in token order, plus a row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct NameFilter {
    predicates: Vec<(&'static str, String)>,
    limit: usize,
}

impl NameFilter {
    /// `None` when there is nothing to filter on.
    pub fn from_tokens(tokens: &[&str], limit: usize) -> Option<Self> {
        let predicates: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| (NAME_LIKE, format!("%{t}%")))
            .collect();
        if predicates.is_empty() {
            return None;
        }
        Some(Self { predicates, limit })
    }

    pub fn sql(&self) -> String {
        let clauses: Vec<String> = self
            .predicates
            .iter()
            .enumerate()
            .map(|(i, (predicate, _))| format!("{predicate} ?{}", i + 1))
            .collect();
        format!(
            "SELECT id, name, year, rating FROM shows WHERE {} LIMIT ?{}",
            clauses.join(" AND "),
            self.predicates.len() + 1
        )
    }

    pub fn params(&self) -> Vec<Box<dyn ToSql>> {
        let mut bind: Vec<Box<dyn ToSql>> = self
            .predicates
            .iter()
            .map(|(_, param)| Box::new(param.clone()) as Box<dyn ToSql>)
            .collect();
        bind.push(Box::new(self.limit as i64));
        bind
    }

    #[cfg(test)]
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(|(_, p)| p.as_str())
    }
}

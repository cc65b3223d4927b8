use std::collections::{BTreeSet, HashSet};

use crate::offer::Offer;

/// Skill names in a tech-stack cell such as `"Python: Advanced; SQL: Regular"`.
///
/// Segments without a `:` are ignored. Names are case-sensitive and kept in
/// cell order, repeats included.
pub fn parse_skills(tech_stack: &str) -> Vec<String> {
    tech_stack
        .split(';')
        .filter_map(|segment| segment.split_once(':'))
        .map(|(name, _)| name.trim().to_string())
        .collect()
}

/// The skills an offer requires, read back from its exported tech-stack cell.
pub fn skills_of(offer: &Offer) -> Vec<String> {
    parse_skills(&offer.tech_stack.to_string())
}

/// Every skill named by any offer, sorted and deduplicated.
pub fn derive_vocabulary<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> Vec<String> {
    offers
        .into_iter()
        .flat_map(skills_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The skills a user has picked, in the order they were picked.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a skill unless it is already selected. Returns true if added.
    pub fn add(&mut self, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        if self.contains(&skill) {
            return false;
        }
        self.0.push(skill);
        true
    }

    /// Returns true if the skill was selected.
    pub fn remove(&mut self, skill: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|s| s != skill);
        self.0.len() != len
    }

    pub fn with(mut self, skill: impl Into<String>) -> Self {
        self.add(skill);
        self
    }

    pub fn without(mut self, skill: &str) -> Self {
        self.remove(skill);
        self
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.iter().any(|s| s == skill)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_set(&self) -> HashSet<&str> {
        self.iter().collect()
    }

    /// Vocabulary entries not selected yet, in vocabulary order.
    pub fn available<'v>(&self, vocabulary: &'v [String]) -> Vec<&'v str> {
        vocabulary
            .iter()
            .map(String::as_str)
            .filter(|skill| !self.contains(skill))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut selection = Selection::new();
        for skill in iter {
            selection.add(skill);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::offer::TechStack;

    fn offer(id: u32, tech_stack: &str) -> Offer {
        let url = Url::parse(&format!("https://justjoin.it/job-offer/{}", id)).unwrap();
        Offer::new(id, url, format!("Offer {}", id))
            .with_tech_stack(tech_stack.parse().unwrap())
    }

    #[test]
    fn parse() {
        assert_eq!(
            parse_skills("Python: Advanced; SQL : Regular;Docker:N/A; no level; "),
            ["Python", "SQL", "Docker"],
        );
        assert_eq!(parse_skills("Go: a:b"), ["Go"]);
        assert!(parse_skills("").is_empty());
    }

    #[test]
    fn parse_is_case_sensitive_and_keeps_repeats() {
        assert_eq!(
            parse_skills("python: Junior; Python: Senior; python: Mid"),
            ["python", "Python", "python"],
        );
    }

    #[test]
    fn skills_of_is_idempotent() {
        let offer = offer(1, "Rust: Advanced; Tokio: Regular; Rust: Master");
        let first = skills_of(&offer);
        assert_eq!(first, ["Rust", "Tokio", "Rust"]);
        assert_eq!(skills_of(&offer), first);
    }

    #[test]
    fn tech_stack_round_trip_keeps_names() {
        let tech_stack: TechStack = [
            ("Python", Some("Advanced".to_string())),
            ("SQL", None),
            ("Apache Spark", Some("Nice to have".to_string())),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = tech_stack.names().map(str::to_string).collect();

        assert_eq!(parse_skills(&tech_stack.to_string()), names);
    }

    #[test]
    fn separators_in_names_do_not_round_trip() {
        let tech_stack: TechStack = [("C; C++", Some("Regular".to_string()))]
            .into_iter()
            .collect();
        assert_eq!(parse_skills(&tech_stack.to_string()), ["C++"]);
    }

    #[test]
    fn vocabulary() {
        let offers = [
            offer(1, "SQL: Regular; Python: Advanced"),
            offer(2, "Go: Junior; SQL: Advanced"),
            offer(3, ""),
        ];
        assert_eq!(derive_vocabulary(&offers), ["Go", "Python", "SQL"]);
        let none: [Offer; 0] = [];
        assert!(derive_vocabulary(&none).is_empty());
    }

    #[test]
    fn selection_add_remove() {
        let mut selection = Selection::new();
        assert!(selection.add("Rust"));
        assert!(selection.add("Go"));
        assert!(!selection.add("Rust"));
        assert_eq!(selection.iter().collect::<Vec<_>>(), ["Rust", "Go"]);

        assert!(selection.remove("Rust"));
        assert!(!selection.remove("Rust"));
        assert_eq!(selection.iter().collect::<Vec<_>>(), ["Go"]);
    }

    #[test]
    fn selection_as_value() {
        let selection = Selection::new().with("SQL").with("Python").with("SQL");
        assert_eq!(selection.len(), 2);
        let selection = selection.without("SQL");
        assert_eq!(selection, ["Python"].into_iter().collect::<Selection>());
    }

    #[test]
    fn available_skills() {
        let vocabulary = ["Go", "Python", "SQL"].map(String::from);
        let selection: Selection = ["SQL", "Go"].into_iter().collect();
        assert_eq!(selection.available(&vocabulary), ["Python"]);
    }
}

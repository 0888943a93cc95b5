//! Location-indexed validation issues.
//!
//! A [`ValidationIssues`] value collects every error and warning found while
//! walking instance data, keyed by the [`Location`] the problem was found at.
//! Errors may be recorded as non-proceedable, which blocks further checks at
//! that location and everywhere beneath it.
//!
//! # Examples
//!
//! ```rust
//! use scim_schema::issues::{ValidationError, ValidationIssues};
//! use scim_schema::location;
//!
//! let mut child = ValidationIssues::new();
//! child.add_error(ValidationError::bad_type("boolean"), false, &[]);
//!
//! let mut issues = ValidationIssues::new();
//! issues.merge(child, &location!["active"]);
//!
//! assert!(!issues.can_proceed(&location!["active"]));
//! assert!(issues.can_proceed(&location!["userName"]));
//! ```

pub mod codes;

pub use codes::{ScimErrorType, ValidationError, ValidationWarning};

use crate::path::{Location, Segment};

use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashMap};

/// Issues grouped by location, in the order locations were first seen.
///
/// Lookups go through a location index, so adding or merging issues costs
/// the same no matter how many locations are already recorded.
#[derive(Debug, Clone)]
struct IssueMap<T> {
    entries: Vec<(Location, Vec<T>)>,
    index: HashMap<Location, usize>,
}

impl<T> Default for IssueMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> IssueMap<T> {
    fn entry(&mut self, location: &[Segment]) -> &mut Vec<T> {
        let position = match self.index.get(location) {
            Some(position) => *position,
            None => {
                self.index.insert(location.to_vec(), self.entries.len());
                self.entries.push((location.to_vec(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[position].1
    }

    fn get(&self, location: &[Segment]) -> &[T] {
        self.index
            .get(location)
            .map(|position| self.entries[*position].1.as_slice())
            .unwrap_or_default()
    }

    fn get_mut(&mut self, location: &[Segment]) -> Option<&mut Vec<T>> {
        let position = *self.index.get(location)?;
        Some(&mut self.entries[position].1)
    }

    /// Iterate over locations holding at least one issue.
    fn iter(&self) -> impl Iterator<Item = (&Location, &Vec<T>)> {
        self.entries
            .iter()
            .filter(|(_, issues)| !issues.is_empty())
            .map(|(location, issues)| (location, issues))
    }

    fn any_under(&self, prefix: &[Segment]) -> bool {
        self.iter().any(|(location, _)| location.starts_with(prefix))
    }
}

impl<T: PartialEq> PartialEq for IssueMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().count() == other.iter().count()
            && self
                .iter()
                .all(|(location, issues)| other.get(location) == issues.as_slice())
    }
}

/// Tree of errors and warnings keyed by location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationIssues {
    errors: IssueMap<ValidationError>,
    warnings: IssueMap<ValidationWarning>,
    stop_proceeding: HashMap<Location, BTreeSet<u16>>,
}

fn prefixed(prefix: &[Segment], location: &[Segment]) -> Location {
    prefix.iter().chain(location.iter()).cloned().collect()
}

impl ValidationIssues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; `proceed = false` blocks evaluation at and below
    /// `location`.
    pub fn add_error(&mut self, issue: ValidationError, proceed: bool, location: &[Segment]) {
        if !proceed {
            self.stop_proceeding
                .entry(location.to_vec())
                .or_default()
                .insert(issue.code());
        }
        self.errors.entry(location).push(issue);
    }

    /// Record a warning; warnings never block.
    pub fn add_warning(&mut self, issue: ValidationWarning, location: &[Segment]) {
        self.warnings.entry(location).push(issue);
    }

    /// Merge issues found beneath `prefix` into this tree.
    pub fn merge(&mut self, other: ValidationIssues, prefix: &[Segment]) {
        let ValidationIssues {
            errors,
            warnings,
            stop_proceeding,
        } = other;

        for (location, codes) in stop_proceeding {
            self.stop_proceeding
                .entry(prefixed(prefix, &location))
                .or_default()
                .extend(codes);
        }
        for (location, issues) in errors.entries {
            if !issues.is_empty() {
                self.errors.entry(&prefixed(prefix, &location)).extend(issues);
            }
        }
        for (location, issues) in warnings.entries {
            if !issues.is_empty() {
                self.warnings.entry(&prefixed(prefix, &location)).extend(issues);
            }
        }
    }

    /// Check whether evaluation may continue at `location`.
    ///
    /// Returns false when the location or any of its ancestors (the root
    /// included) carries a non-proceedable error.
    pub fn can_proceed(&self, location: &[Segment]) -> bool {
        (0..=location.len()).all(|i| !self.stop_proceeding.contains_key(&location[..i]))
    }

    /// Check [`can_proceed`](Self::can_proceed) for several locations at once.
    pub fn can_proceed_all<L: AsRef<[Segment]>>(&self, locations: &[L]) -> bool {
        locations
            .iter()
            .all(|location| self.can_proceed(location.as_ref()))
    }

    /// Check whether any error was recorded at or beneath `location`.
    pub fn has_errors(&self, location: &[Segment]) -> bool {
        self.errors.any_under(location)
    }

    /// Check whether any warning was recorded at or beneath `location`.
    pub fn has_warnings(&self, location: &[Segment]) -> bool {
        self.warnings.any_under(location)
    }

    pub fn is_empty(&self) -> bool {
        !self.has_errors(&[]) && !self.has_warnings(&[])
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Location, &Vec<ValidationError>)> {
        self.errors.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&Location, &Vec<ValidationWarning>)> {
        self.warnings.iter()
    }

    /// Get the errors recorded exactly at `location`.
    pub fn errors_at(&self, location: &[Segment]) -> &[ValidationError] {
        self.errors.get(location)
    }

    /// Get the warnings recorded exactly at `location`.
    pub fn warnings_at(&self, location: &[Segment]) -> &[ValidationWarning] {
        self.warnings.get(location)
    }

    /// Get a sub-tree of issues located beneath `prefix`, re-homed to the root.
    ///
    /// `error_codes` and `warning_codes` restrict the copied issues to the
    /// given codes; `None` keeps all of them.
    pub fn get(
        &self,
        error_codes: Option<&[u16]>,
        warning_codes: Option<&[u16]>,
        prefix: &[Segment],
    ) -> ValidationIssues {
        let mut copy = ValidationIssues::new();

        for (location, issues) in self.errors.iter() {
            if !location.starts_with(prefix) {
                continue;
            }
            let issues = issues
                .iter()
                .filter(|issue| error_codes.is_none_or(|codes| codes.contains(&issue.code())))
                .cloned();
            copy.errors.entry(&location[prefix.len()..]).extend(issues);
        }

        for (location, issues) in self.warnings.iter() {
            if !location.starts_with(prefix) {
                continue;
            }
            let issues = issues
                .iter()
                .filter(|issue| warning_codes.is_none_or(|codes| codes.contains(&issue.code())))
                .cloned();
            copy.warnings.entry(&location[prefix.len()..]).extend(issues);
        }

        for (location, codes) in &self.stop_proceeding {
            if !location.starts_with(prefix) {
                continue;
            }
            let codes: BTreeSet<u16> = codes
                .iter()
                .filter(|code| error_codes.is_none_or(|allowed| allowed.contains(code)))
                .copied()
                .collect();
            if !codes.is_empty() {
                copy.stop_proceeding
                    .insert(location[prefix.len()..].to_vec(), codes);
            }
        }

        copy
    }

    /// Remove errors with the given codes recorded exactly at `location`.
    ///
    /// The removed errors are returned re-homed to the root; blocking flags
    /// for the removed codes are lifted.
    pub fn pop_errors(&mut self, codes: &[u16], location: &[Segment]) -> ValidationIssues {
        let mut popped = ValidationIssues::new();
        let Some(recorded) = self.errors.get_mut(location) else {
            return popped;
        };

        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(recorded)
            .into_iter()
            .partition(|issue| !codes.contains(&issue.code()));
        *recorded = kept;

        let mut blocking = Vec::new();
        if let Some(stop_codes) = self.stop_proceeding.get_mut(location) {
            for issue in &removed {
                if stop_codes.remove(&issue.code()) {
                    blocking.push(issue.code());
                }
            }
            if stop_codes.is_empty() {
                self.stop_proceeding.remove(location);
            }
        }

        for issue in removed {
            let proceed = !blocking.contains(&issue.code());
            popped.add_error(issue, proceed, &[]);
        }
        popped
    }

    /// Render the issues as the nested wire tree.
    ///
    /// Each level is keyed by path segment and holds `_errors`/`_warnings`
    /// arrays of `{code, error?, context?}` objects.
    pub fn to_rendered_tree(&self, include_message: bool, include_context: bool) -> Value {
        let mut output = Map::new();
        for (location, issues) in self.errors.iter() {
            let rendered = issues
                .iter()
                .map(|issue| render(issue.code(), issue.message(), issue.context(), include_message, include_context))
                .collect();
            insert_rendered(&mut output, location, "_errors", rendered);
        }
        for (location, issues) in self.warnings.iter() {
            let rendered = issues
                .iter()
                .map(|issue| render(issue.code(), issue.message(), issue.context(), include_message, include_context))
                .collect();
            insert_rendered(&mut output, location, "_warnings", rendered);
        }
        Value::Object(output)
    }
}

fn render(
    code: u16,
    message: &str,
    context: &Map<String, Value>,
    include_message: bool,
    include_context: bool,
) -> Value {
    let mut output = json!({ "code": code });
    if include_message {
        output["error"] = Value::String(message.to_string());
    }
    if include_context {
        output["context"] = Value::Object(context.clone());
    }
    output
}

fn insert_rendered(output: &mut Map<String, Value>, location: &[Segment], key: &str, issues: Vec<Value>) {
    let mut level = output;
    for segment in location {
        let next = level
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            *next = Value::Object(Map::new());
        }
        let Value::Object(map) = next else {
            return;
        };
        level = map;
    }
    level.insert(key.to_string(), Value::Array(issues));
}

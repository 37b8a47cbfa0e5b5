use std::{fmt, slice};

/// Handle identifying a variable inside a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ValueReference(pub u32);

impl fmt::Display for ValueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VariableType {
    Real,
    Integer,
    Boolean,
    String,
}

/// A single entry of a [`VariableDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: String,
    pub value_reference: ValueReference,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: VariableType,
}

impl Variable {
    /// Creates a new variable entry.
    pub fn new(name: impl Into<String>, value_reference: u32, kind: VariableType) -> Self {
        Self {
            name: name.into(),
            value_reference: ValueReference(value_reference),
            kind,
        }
    }

    /// Creates a `Real` variable entry.
    pub fn real(name: impl Into<String>, value_reference: u32) -> Self {
        Self::new(name, value_reference, VariableType::Real)
    }

    /// Creates an `Integer` variable entry.
    pub fn integer(name: impl Into<String>, value_reference: u32) -> Self {
        Self::new(name, value_reference, VariableType::Integer)
    }
}

/// Ordered, immutable catalog of the variables a component exposes.
///
/// The directory is built by whoever parses the model's metadata and handed to
/// the driver as-is. Position 0 is a reserved leading slot, conventionally the
/// independent variable `time`; the driver does not sample it from the
/// component. Every other position is tracked and sampled after each committed
/// step, and its position is the output slot it is recorded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VariableDirectory {
    variables: Vec<Variable>,
}

impl VariableDirectory {
    /// Creates a directory from variables in their catalog order.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self { variables }
    }

    /// Returns the number of entries, including the reserved leading slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns `true` if the directory has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns the entry at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    /// Looks up an entry by name and returns its position and the entry.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .find(|(_, variable)| variable.name == name)
    }

    /// Iterates over all entries in catalog order.
    pub fn iter(&self) -> slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    /// Iterates over the tracked entries with their slot positions.
    ///
    /// The reserved leading slot is skipped.
    pub fn tracked(&self) -> impl Iterator<Item = (usize, &Variable)> {
        self.variables.iter().enumerate().skip(1)
    }
}

impl FromIterator<Variable> for VariableDirectory {
    fn from_iter<T: IntoIterator<Item = Variable>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VariableDirectory {
    type Item = &'a Variable;
    type IntoIter = slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> VariableDirectory {
        [
            Variable::real("time", 0),
            Variable::real("h", 1),
            Variable::integer("count", 7),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn tracked_skips_reserved_slot() {
        let dir = directory();

        let tracked: Vec<_> = dir.tracked().map(|(i, v)| (i, v.name.as_str())).collect();

        assert_eq!(tracked, vec![(1, "h"), (2, "count")]);
    }

    #[test]
    fn find_returns_position() {
        let dir = directory();

        let (index, variable) = dir.find("count").expect("count is in the directory");

        assert_eq!(index, 2);
        assert_eq!(variable.value_reference, ValueReference(7));
        assert_eq!(variable.kind, VariableType::Integer);
        assert!(dir.find("missing").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_json_catalog() {
        let json = r#"[
            {"name": "time", "value_reference": 0, "type": "real"},
            {"name": "flag", "value_reference": 3, "type": "boolean"}
        ]"#;

        let dir: VariableDirectory = serde_json::from_str(json).expect("valid catalog");

        assert_eq!(dir.len(), 2);
        assert_eq!(
            dir.get(1),
            Some(&Variable::new("flag", 3, VariableType::Boolean))
        );
    }
}

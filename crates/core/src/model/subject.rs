use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SubjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,
}

/// Top level of the content hierarchy: a subject groups topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
}

impl Subject {
    /// Creates a new subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if the name is empty or whitespace-only.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        description: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        let image_url = image_url.filter(|u| !u.trim().is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
            image_url,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_rejects_empty_name() {
        let err = Subject::new(SubjectId::generate(), "  ", None, None).unwrap_err();
        assert_eq!(err, SubjectError::EmptyName);
    }

    #[test]
    fn subject_trims_name_and_filters_empty_description() {
        let subject = Subject::new(
            SubjectId::new("s1").unwrap(),
            "  Mathematics  ",
            Some("   ".into()),
            Some(String::new()),
        )
        .unwrap();

        assert_eq!(subject.name(), "Mathematics");
        assert_eq!(subject.description(), None);
        assert_eq!(subject.image_url(), None);
    }
}

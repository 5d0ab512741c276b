use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{SubjectId, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,
}

/// A topic within a subject; quizzes hang off topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    name: String,
    description: Option<String>,
    subject_id: SubjectId,
    image_url: Option<String>,
}

impl Topic {
    /// Creates a new topic under the given subject.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyName` if the name is empty or whitespace-only.
    pub fn new(
        id: TopicId,
        name: impl Into<String>,
        description: Option<String>,
        subject_id: SubjectId,
        image_url: Option<String>,
    ) -> Result<Self, TopicError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TopicError::EmptyName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        let image_url = image_url.filter(|u| !u.trim().is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
            subject_id,
            image_url,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
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
    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
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
    fn topic_rejects_empty_name() {
        let err = Topic::new(
            TopicId::generate(),
            "",
            None,
            SubjectId::generate(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, TopicError::EmptyName);
    }

    #[test]
    fn topic_links_back_to_subject() {
        let subject_id = SubjectId::new("s1").unwrap();
        let topic = Topic::new(
            TopicId::new("t1").unwrap(),
            "Algebra",
            Some("linear equations".into()),
            subject_id.clone(),
            None,
        )
        .unwrap();

        assert_eq!(topic.subject_id(), &subject_id);
        assert_eq!(topic.description(), Some("linear equations"));
    }
}

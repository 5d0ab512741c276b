use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error type for constructing an id from an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdError {
    kind: &'static str,
}

impl fmt::Display for InvalidIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must not be empty", self.kind)
    }
}

impl std::error::Error for InvalidIdError {}

macro_rules! string_id {
    ($name:ident, $kind:literal, $doc:literal) => {
        #[doc = $doc]
        ///
        /// Backed by the content store's string keys.
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing store key.
            ///
            /// # Errors
            ///
            /// Returns `InvalidIdError` if the key is empty or whitespace-only.
            pub fn new(id: impl Into<String>) -> Result<Self, InvalidIdError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(InvalidIdError { kind: $kind });
                }
                Ok(Self(id))
            }

            /// Generates a fresh random id for newly created records.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the underlying key.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(SubjectId, "SubjectId", "Unique identifier for a Subject.");
string_id!(TopicId, "TopicId", "Unique identifier for a Topic.");
string_id!(QuizId, "QuizId", "Unique identifier for a Quiz.");
string_id!(QuestionId, "QuestionId", "Unique identifier for a Question.");
string_id!(UserId, "UserId", "Unique identifier for a user account.");

// ─── Tests ─────────────────────────────────────────────────────────────────────

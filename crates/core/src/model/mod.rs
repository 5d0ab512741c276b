mod ids;
mod question;
mod quiz;
mod subject;
mod topic;

pub use ids::{InvalidIdError, QuestionId, QuizId, SubjectId, TopicId, UserId};
pub use question::{Question, QuestionError};
pub use quiz::{Quiz, QuizError, DEFAULT_PASSING_PERCENTAGE, DEFAULT_TIME_LIMIT_MINUTES};
pub use subject::{Subject, SubjectError};
pub use topic::{Topic, TopicError};

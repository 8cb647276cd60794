mod ids;
mod personalization;
pub mod questionnaire;
pub mod reference;
mod route;
mod user;

pub use ids::{QuestionId, UserId};
pub use personalization::{InputType, PersonalizationAnswer, PersonalizationData, Upsert};
pub use questionnaire::{
    PersonalizationQuestion, QuestionCursor, Questionnaire, QuestionnaireError,
};
pub use reference::{
    Difficulty, ExampleText, GeneratedTextRequest, Level, StudentStats, SystemSummary,
};
pub use route::{Route, RouteParseError};
pub use user::{UserProfile, UserType, UserTypeParseError, email_from_name};

mod activity;
mod favorite;
mod ids;
mod quiz;
mod roadmap;
mod session;
mod user;

pub use ids::{ParseIdError, QuizResultId, UserId};

pub use activity::{
    ActivityError, RECENT_ACTIVITY_LIMIT, SearchEntry, SearchQuery, ViewedCareer,
};
pub use favorite::{FavoriteError, FavoriteJob, JobTitle};
pub use quiz::{NewQuizResult, QuizResult};
pub use roadmap::{CareerTitle, CompletedStep, StepError, StepIndex};
pub use session::{SESSION_TTL_HOURS, SessionId, SessionUser};
pub use user::{Email, Grade, NewUser, User, UserError, UserName};

//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod ordering;
mod space_repo;
mod list_repo;
mod task_repo;
mod onboarding_repo;


pub use traits::{OrderedRepository, Repository, SearchableRepository};
pub use db::{init_db, DbState, SharedConnection};
pub use ordering::OrderScope;
pub use space_repo::SpaceRepository;
pub use list_repo::ListRepository;
pub use task_repo::TaskRepository;
pub use onboarding_repo::OnboardingRepository;

/// All repositories over one shared connection
pub struct Repositories {
    pub spaces: SpaceRepository,
    pub lists: ListRepository,
    pub tasks: TaskRepository,
    pub onboarding: OnboardingRepository,
}

impl Repositories {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            spaces: SpaceRepository::new(conn.clone()),
            lists: ListRepository::new(conn.clone()),
            tasks: TaskRepository::new(conn.clone()),
            onboarding: OnboardingRepository::new(conn),
        }
    }
}

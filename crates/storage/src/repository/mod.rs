pub mod athlete;
pub mod bestlist;
pub mod club;
pub mod discipline;
pub mod event;
pub mod result;
pub mod session;

pub use athlete::AthleteRepository;
pub use bestlist::BestlistRepository;
pub use club::ClubRepository;
pub use discipline::{DisciplineFilter, DisciplineRepository};
pub use event::EventRepository;
pub use result::ResultRepository;

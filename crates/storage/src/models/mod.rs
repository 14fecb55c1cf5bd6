mod athlete;
mod club;
mod discipline;
mod event;
mod result;

pub use athlete::{Athlete, NewAthlete};
pub use club::{Club, NewClub};
pub use discipline::Discipline;
pub use event::{Event, NewEvent};
pub use result::{NewResult, ResultEntry, StoredResult};

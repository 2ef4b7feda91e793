pub mod cat;
pub mod user;

pub use cat::{Cat, CatFields, CatFilter, CatPatch};
pub use user::User;

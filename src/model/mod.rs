mod song;
mod user;

pub use song::Song;
pub use user::User;

mod shell;
pub use shell::Shell;

mod home;
pub use home::Home;

mod upload;
pub use upload::Upload;

mod explore;
pub use explore::Explore;

mod profile;
pub use profile::Profile;

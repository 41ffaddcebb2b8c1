mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod shell_layout;
pub use shell_layout::ShellLayoutView;

mod home;
pub use home::HomeView;

mod upload;
pub use upload::UploadView;

mod explore;
pub use explore::ExploreView;

mod profile;
pub use profile::ProfileView;

pub mod daemon;
pub mod health;
pub mod init;
pub mod keys;
pub mod open;
pub mod records;
pub mod seal;
pub mod share;
pub mod validate;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use keys::Keys;
pub use open::Open;
pub use records::Records;
pub use seal::Seal;
pub use validate::Validate;
pub use version::Version;

//! Wire types shared by the directory server and its clients.

pub mod directory;
pub mod employees;

pub use directory::DirectorySource;
pub use employees::Employee;

mod structs;

pub use structs::JsonFileStore;

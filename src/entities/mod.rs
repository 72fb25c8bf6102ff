pub mod prelude;

pub mod drop_files;

pub use super::drop_files::Entity as DropFiles;

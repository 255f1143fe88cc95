pub mod album_art;
pub mod file_scanner;

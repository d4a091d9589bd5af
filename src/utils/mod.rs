pub mod csv;
pub mod db_utils;
pub mod summary;

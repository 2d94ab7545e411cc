pub mod unique_name;
pub mod version;
